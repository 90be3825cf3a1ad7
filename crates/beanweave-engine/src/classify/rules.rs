//! Member rules and the per-strategy rule tables
//!
//! A rule inspects one member and either claims it (returning the responsibility it
//! was assigned) or passes. Rules are tried in table order; the first claim wins.
//! A rule may also record artifacts without claiming, as the adapter rule does.

use super::configuration::{self, ConfigurationProperty};
use super::factory::{self, Producer};
use super::intercept;
use super::{adapter, has_declared_scope, Accumulator, FieldView, MethodView, PropertyView, TypeScope};
use crate::artifact::{AdviceKind, ProducerKind, Responsibility, ValuePoint};
use crate::error::ProcessingError;

pub(crate) type Claim = Result<Option<Responsibility>, ProcessingError>;

pub(crate) type FieldRule = fn(&TypeScope<'_>, &mut Accumulator, &FieldView<'_>) -> Claim;
pub(crate) type MethodRule = fn(&TypeScope<'_>, &mut Accumulator, &MethodView<'_>) -> Claim;
pub(crate) type SetterRule =
    fn(&TypeScope<'_>, &mut Accumulator, &PropertyView<'_>, &MethodView<'_>) -> Claim;
pub(crate) type PropertyRule = fn(&TypeScope<'_>, &mut Accumulator, &PropertyView<'_>) -> Claim;

/// Rule applied to a property's write accessor
#[derive(Clone, Copy)]
pub(crate) enum WriteRule {
    /// Same rule as for a plain method
    Method(MethodRule),
    /// Rule that needs the enclosing property
    Setter(SetterRule),
}

/// Rules for each kind of member, in precedence order
pub(crate) struct RuleTable {
    /// Whole-property rules, tried before the accessors
    pub(crate) property: &'static [PropertyRule],
    pub(crate) write: &'static [WriteRule],
    pub(crate) read: &'static [MethodRule],
    pub(crate) field: &'static [FieldRule],
    pub(crate) method: &'static [MethodRule],
}

const BEAN_WRITE: &[WriteRule] = &[
    WriteRule::Method(lifecycle),
    WriteRule::Method(inject_method),
    WriteRule::Setter(qualified_setter),
    WriteRule::Method(adapter_method),
    WriteRule::Method(intercept_method),
    WriteRule::Method(executable),
];
const BEAN_READ: &[MethodRule] = &[adapter_method, intercept_method, executable];
const BEAN_FIELD: &[FieldRule] = &[field_value, field_inject];
const BEAN_METHOD: &[MethodRule] = &[lifecycle, inject_method, adapter_method, intercept_method, executable];

pub(crate) static DECLARED_BEAN: RuleTable = RuleTable {
    property: &[],
    write: BEAN_WRITE,
    read: BEAN_READ,
    field: BEAN_FIELD,
    method: BEAN_METHOD,
};

pub(crate) static FACTORY: RuleTable = RuleTable {
    property: &[factory_property],
    write: BEAN_WRITE,
    read: BEAN_READ,
    field: &[factory_field, field_value, field_inject],
    method: &[
        factory_method,
        lifecycle,
        inject_method,
        adapter_method,
        intercept_method,
        executable,
    ],
};

pub(crate) static CONFIGURATION_PROPERTIES: RuleTable = RuleTable {
    property: &[builder_property],
    write: &[
        WriteRule::Method(lifecycle),
        WriteRule::Method(inject_method),
        WriteRule::Setter(qualified_setter),
        WriteRule::Setter(configuration_setter),
        WriteRule::Method(adapter_method),
        WriteRule::Method(intercept_method),
        WriteRule::Method(executable),
    ],
    read: BEAN_READ,
    field: &[builder_field, field_value, field_inject, configuration_field],
    method: BEAN_METHOD,
};

pub(crate) static INTRODUCTION_OVER_AOP: RuleTable = RuleTable {
    property: &[],
    write: &[
        WriteRule::Method(lifecycle),
        WriteRule::Method(inject_method),
        WriteRule::Method(introduced_method),
        WriteRule::Setter(qualified_setter),
        WriteRule::Method(adapter_method),
        WriteRule::Method(intercept_method),
        WriteRule::Method(executable),
    ],
    read: &[introduced_method, adapter_method, intercept_method, executable],
    field: BEAN_FIELD,
    method: &[
        lifecycle,
        inject_method,
        introduced_method,
        adapter_method,
        intercept_method,
        executable,
    ],
};

pub(crate) static INTRODUCTION_INTERFACE: RuleTable = RuleTable {
    property: &[],
    write: &[
        WriteRule::Method(configuration_getter),
        WriteRule::Method(introduced_method),
        WriteRule::Method(adapter_method),
        WriteRule::Method(intercept_method),
        WriteRule::Method(executable),
    ],
    read: &[
        configuration_getter,
        introduced_method,
        adapter_method,
        intercept_method,
        executable,
    ],
    field: &[],
    method: &[
        configuration_getter,
        introduced_method,
        adapter_method,
        intercept_method,
        executable,
    ],
};

// ============================================================================
// Shared checks
// ============================================================================

/// A static member may only be claimed when explicitly executable and reachable
pub(crate) fn static_check(scope: &TypeScope<'_>, m: &MethodView<'_>) -> Result<(), ProcessingError> {
    if !m.method.modifiers.is_static {
        return Ok(());
    }
    let markers = scope.markers();
    if !m.meta.has_declared_stereotype(&markers.executable) {
        return Err(ProcessingError::StaticMemberNotExecutable {
            element: scope.member_ref(m.id),
            executable: markers.executable.clone(),
        });
    }
    let accessible = scope.is_accessible(&m.method.modifiers, m.method.declaring_type.as_deref());
    if !accessible && !m.meta.has_stereotype(&markers.reflective_access) {
        return Err(ProcessingError::InaccessibleMember {
            element: scope.member_ref(m.id),
            reflective: markers.reflective_access.clone(),
        });
    }
    Ok(())
}

fn method_requires_reflection(scope: &TypeScope<'_>, m: &MethodView<'_>) -> Result<bool, ProcessingError> {
    scope.requires_reflection(
        &m.method.modifiers,
        m.method.declaring_type.as_deref(),
        m.meta,
        || scope.member_ref(m.id),
    )
}

fn field_requires_reflection(scope: &TypeScope<'_>, f: &FieldView<'_>) -> Result<bool, ProcessingError> {
    scope.requires_reflection(
        &f.field.modifiers,
        f.field.declaring_type.as_deref(),
        f.meta,
        || scope.member_ref(f.id),
    )
}

// ============================================================================
// Field rules
// ============================================================================

fn field_value(scope: &TypeScope<'_>, acc: &mut Accumulator, f: &FieldView<'_>) -> Claim {
    let modifiers = &f.field.modifiers;
    let markers = scope.markers();
    if modifiers.is_static || modifiers.is_final {
        return Ok(None);
    }
    if !f.meta.has_stereotype(&markers.value) && !f.meta.has_stereotype(&markers.property) {
        return Ok(None);
    }
    let requires_reflection = field_requires_reflection(scope, f)?;
    let path = f
        .meta
        .string_value(&markers.value, "value")
        .or_else(|| f.meta.string_value(&markers.property, "name"))
        .map(str::to_string);
    let point = scope.field_point(f, requires_reflection);
    let Some(definition) = acc.target() else {
        return Ok(None);
    };
    definition.field_values.push(ValuePoint { point, path });
    Ok(Some(Responsibility::FieldValue))
}

fn field_inject(scope: &TypeScope<'_>, acc: &mut Accumulator, f: &FieldView<'_>) -> Claim {
    let modifiers = &f.field.modifiers;
    let markers = scope.markers();
    if modifiers.is_static || modifiers.is_final {
        return Ok(None);
    }
    if !f.meta.has_declared_stereotype(&markers.inject)
        && !f.meta.has_declared_stereotype(&markers.qualifier)
    {
        return Ok(None);
    }
    let requires_reflection = field_requires_reflection(scope, f)?;
    let point = scope.field_point(f, requires_reflection);
    let Some(definition) = acc.target() else {
        return Ok(None);
    };
    definition.field_injections.push(point);
    Ok(Some(Responsibility::FieldInjection))
}

fn factory_field(scope: &TypeScope<'_>, acc: &mut Accumulator, f: &FieldView<'_>) -> Claim {
    let markers = scope.markers();
    if !f.meta.has_declared_stereotype(&markers.bean) && !has_declared_scope(f.meta, markers) {
        return Ok(None);
    }
    if f.field.modifiers.is_private() {
        return Err(ProcessingError::PrivateProducerField {
            element: scope.member_ref(f.id),
        });
    }
    let requires_reflection =
        !scope.is_accessible(&f.field.modifiers, f.field.declaring_type.as_deref());
    factory::visit_producer(
        scope,
        acc,
        Producer {
            kind: ProducerKind::Field,
            member: f.field.name.clone(),
            produced: &f.field.ty,
            meta: f.meta,
            element: scope.member_ref(f.id),
            parameters: Vec::new(),
            requires_reflection,
        },
    )?;
    Ok(Some(Responsibility::FactoryProducer))
}

fn configuration_field(scope: &TypeScope<'_>, acc: &mut Accumulator, f: &FieldView<'_>) -> Claim {
    let modifiers = &f.field.modifiers;
    let Some(prefix) = scope.configuration_prefix.as_deref() else {
        return Ok(None);
    };
    if modifiers.is_static || modifiers.is_final {
        return Ok(None);
    }
    let requires_reflection = field_requires_reflection(scope, f)?;
    let path = configuration::property_path(prefix, &f.field.name);
    acc.record_configuration(ConfigurationProperty {
        path: path.clone(),
        ty: f.field.ty.clone(),
        declaring_type: scope.type_name.clone(),
        member: f.field.name.clone(),
    });
    let point = scope.field_point(f, requires_reflection);
    let Some(definition) = acc.target() else {
        return Ok(None);
    };
    definition.configuration_values.push(ValuePoint {
        point,
        path: Some(path),
    });
    Ok(Some(Responsibility::ConfigurationValue))
}

fn builder_field(scope: &TypeScope<'_>, acc: &mut Accumulator, f: &FieldView<'_>) -> Claim {
    if !f.meta.has_stereotype(&scope.markers().configuration_builder) {
        return Ok(None);
    }
    let requires_reflection = field_requires_reflection(scope, f)?;
    let point = scope.field_point(f, requires_reflection);
    configuration::visit_builder(scope, acc, &f.field.ty, f.meta, point, scope.member_ref(f.id))?;
    Ok(Some(Responsibility::BuilderProperty))
}

// ============================================================================
// Method rules
// ============================================================================

fn lifecycle(scope: &TypeScope<'_>, acc: &mut Accumulator, m: &MethodView<'_>) -> Claim {
    let markers = scope.markers();
    let responsibility = if m.meta.has_declared_stereotype(&markers.post_construct) {
        Responsibility::LifecycleInit
    } else if m.meta.has_declared_stereotype(&markers.pre_destroy) {
        Responsibility::LifecycleDestroy
    } else {
        return Ok(None);
    };
    static_check(scope, m)?;
    let requires_reflection = method_requires_reflection(scope, m)?;
    let point = scope.method_point(m, requires_reflection);
    let Some(definition) = acc.target() else {
        return Ok(None);
    };
    match responsibility {
        Responsibility::LifecycleInit => definition.post_construct.push(point),
        _ => definition.pre_destroy.push(point),
    }
    Ok(Some(responsibility))
}

fn inject_method(scope: &TypeScope<'_>, acc: &mut Accumulator, m: &MethodView<'_>) -> Claim {
    if m.method.modifiers.is_static || !m.meta.has_declared_stereotype(&scope.markers().inject) {
        return Ok(None);
    }
    static_check(scope, m)?;
    let requires_reflection = method_requires_reflection(scope, m)?;
    let point = scope.method_point(m, requires_reflection);
    let Some(definition) = acc.target() else {
        return Ok(None);
    };
    definition.method_injections.push(point);
    Ok(Some(Responsibility::MethodInjection))
}

fn adapter_method(scope: &TypeScope<'_>, acc: &mut Accumulator, m: &MethodView<'_>) -> Claim {
    if m.meta.has_stereotype(&scope.markers().adapter) {
        static_check(scope, m)?;
        adapter::visit_adapter(scope, acc, m)?;
    }
    Ok(None)
}

fn intercept_method(scope: &TypeScope<'_>, acc: &mut Accumulator, m: &MethodView<'_>) -> Claim {
    intercept::visit_advised(scope, acc, m)
}

fn executable(scope: &TypeScope<'_>, acc: &mut Accumulator, m: &MethodView<'_>) -> Claim {
    let markers = scope.markers();
    let method = m.method;
    if method.is_synthetic {
        return Ok(None);
    }
    let declaring = method.declaring_type.as_deref();
    let declaring_meta = scope.declaring_meta(declaring);
    let on_method = m.meta.has_stereotype(&markers.executable);
    if !on_method && !declaring_meta.has_stereotype(&markers.executable) {
        return Ok(None);
    }

    let accessible = scope.is_accessible(&method.modifiers, declaring);
    let reflective = m.meta.has_stereotype(&markers.reflective_access);
    if on_method {
        if !accessible && !reflective {
            return Err(ProcessingError::PrivateExecutable {
                element: scope.member_ref(m.id),
                reflective: markers.reflective_access.clone(),
            });
        }
        static_check(scope, m)?;
    } else {
        // type-level executable: skip what the type cannot expose
        if method.modifiers.is_static || !accessible {
            return Ok(None);
        }
        if !scope.ty.declares(declaring) && !method.modifiers.is_public() {
            return Ok(None);
        }
    }

    let point = scope.method_point(m, !accessible);
    let Some(definition) = acc.target() else {
        return Ok(None);
    };
    definition.executable_methods.push(point);
    Ok(Some(Responsibility::Executable))
}

fn factory_method(scope: &TypeScope<'_>, acc: &mut Accumulator, m: &MethodView<'_>) -> Claim {
    let markers = scope.markers();
    if !m.meta.has_declared_stereotype(&markers.bean) && !has_declared_scope(m.meta, markers) {
        return Ok(None);
    }
    if m.method.return_type.is_void() {
        return Ok(None);
    }
    let requires_reflection = method_requires_reflection(scope, m)?;
    factory::visit_producer(
        scope,
        acc,
        Producer {
            kind: ProducerKind::Method,
            member: m.method.name.clone(),
            produced: &m.method.return_type,
            meta: m.meta,
            element: scope.member_ref(m.id),
            parameters: m.method.params.clone(),
            requires_reflection,
        },
    )?;
    Ok(Some(Responsibility::FactoryProducer))
}

fn introduced_method(scope: &TypeScope<'_>, acc: &mut Accumulator, m: &MethodView<'_>) -> Claim {
    if m.method.modifiers.is_static || !scope.ty.is_abstract_method(m.method) {
        return Ok(None);
    }
    let declaring_type = scope.declaring_name(m.method.declaring_type.as_deref());
    let plan = acc.plan_for(scope)?;
    plan.add_method(
        m.method,
        declaring_type,
        &scope.type_meta,
        m.meta,
        scope.markers(),
        AdviceKind::Introduction,
    );
    Ok(Some(Responsibility::Intercepted))
}

fn configuration_getter(scope: &TypeScope<'_>, acc: &mut Accumulator, m: &MethodView<'_>) -> Claim {
    let Some(prefix) = scope.configuration_prefix.as_deref() else {
        return Ok(None);
    };
    if m.method.modifiers.is_static || !scope.ty.is_abstract_method(m.method) {
        return Ok(None);
    }
    if !m.method.params.is_empty() || m.method.return_type.is_void() {
        return Err(ProcessingError::InvalidConfigurationMethod {
            element: scope.member_ref(m.id),
        });
    }
    let name = configuration::getter_property_name(&m.method.name);
    let path = configuration::property_path(prefix, &name);
    acc.record_configuration(ConfigurationProperty {
        path: path.clone(),
        ty: m.method.return_type.clone(),
        declaring_type: scope.type_name.clone(),
        member: m.method.name.clone(),
    });
    let declaring_type = scope.declaring_name(m.method.declaring_type.as_deref());
    let plan = acc.plan_for(scope)?;
    plan.add_method(
        m.method,
        declaring_type,
        &scope.type_meta,
        m.meta,
        scope.markers(),
        AdviceKind::Introduction,
    )
    .configuration_path = Some(path);
    Ok(Some(Responsibility::ConfigurationValue))
}

// ============================================================================
// Write accessor rules
// ============================================================================

fn qualified_setter(
    scope: &TypeScope<'_>,
    acc: &mut Accumulator,
    _prop: &PropertyView<'_>,
    w: &MethodView<'_>,
) -> Claim {
    if w.method.modifiers.is_static || !w.meta.has_stereotype(&scope.markers().qualifier) {
        return Ok(None);
    }
    let requires_reflection = method_requires_reflection(scope, w)?;
    let point = scope.method_point(w, requires_reflection);
    let Some(definition) = acc.target() else {
        return Ok(None);
    };
    definition.method_injections.push(point);
    Ok(Some(Responsibility::MethodInjection))
}

fn configuration_setter(
    scope: &TypeScope<'_>,
    acc: &mut Accumulator,
    prop: &PropertyView<'_>,
    w: &MethodView<'_>,
) -> Claim {
    let Some(prefix) = scope.configuration_prefix.as_deref() else {
        return Ok(None);
    };
    if w.method.modifiers.is_static {
        return Ok(None);
    }
    let requires_reflection = method_requires_reflection(scope, w)?;
    let path = configuration::property_path(prefix, &prop.prop.name);
    acc.record_configuration(ConfigurationProperty {
        path: path.clone(),
        ty: prop.prop.ty.clone(),
        declaring_type: scope.type_name.clone(),
        member: w.method.name.clone(),
    });
    let point = scope.method_point(w, requires_reflection);
    let Some(definition) = acc.target() else {
        return Ok(None);
    };
    definition.configuration_values.push(ValuePoint {
        point,
        path: Some(path),
    });
    Ok(Some(Responsibility::ConfigurationValue))
}

// ============================================================================
// Property rules
// ============================================================================

fn factory_property(scope: &TypeScope<'_>, acc: &mut Accumulator, p: &PropertyView<'_>) -> Claim {
    let markers = scope.markers();
    if !p.meta.has_declared_stereotype(&markers.bean) && !has_declared_scope(&p.meta, markers) {
        return Ok(None);
    }
    let (element, requires_reflection) = match (&p.read, &p.field) {
        (Some(read), _) => (
            scope.member_ref(read.id),
            !scope.is_accessible(&read.method.modifiers, read.method.declaring_type.as_deref()),
        ),
        (None, Some(field)) => {
            if field.field.modifiers.is_private() {
                return Err(ProcessingError::PrivateProducerField {
                    element: scope.member_ref(field.id),
                });
            }
            (
                scope.member_ref(field.id),
                !scope.is_accessible(&field.field.modifiers, field.field.declaring_type.as_deref()),
            )
        }
        (None, None) => return Ok(None),
    };
    factory::visit_producer(
        scope,
        acc,
        Producer {
            kind: ProducerKind::Property,
            member: p.prop.name.clone(),
            produced: &p.prop.ty,
            meta: &p.meta,
            element,
            parameters: Vec::new(),
            requires_reflection,
        },
    )?;
    Ok(Some(Responsibility::FactoryProducer))
}

fn builder_property(scope: &TypeScope<'_>, acc: &mut Accumulator, p: &PropertyView<'_>) -> Claim {
    if !p.meta.has_stereotype(&scope.markers().configuration_builder) {
        return Ok(None);
    }
    let (point, element) = match (&p.write, &p.field) {
        (Some(write), _) => {
            let requires_reflection = method_requires_reflection(scope, write)?;
            (scope.method_point(write, requires_reflection), scope.member_ref(write.id))
        }
        (None, Some(field)) => {
            let requires_reflection = field_requires_reflection(scope, field)?;
            (scope.field_point(field, requires_reflection), scope.member_ref(field.id))
        }
        (None, None) => match &p.read {
            Some(read) => (scope.method_point(read, false), scope.member_ref(read.id)),
            None => return Ok(None),
        },
    };
    configuration::visit_builder(scope, acc, &p.prop.ty, &p.meta, point, element)?;
    Ok(Some(Responsibility::BuilderProperty))
}
