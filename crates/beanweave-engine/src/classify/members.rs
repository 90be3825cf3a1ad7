//! Member traversal
//!
//! Properties are visited first. Every member belonging to a visited property is
//! consumed, so the plain member pass that follows never sees it twice.

use super::rules::{MethodRule, RuleTable, WriteRule};
use super::{Accumulator, FieldView, MethodView, PropertyView, TypeScope};
use crate::artifact::Responsibility;
use crate::error::ProcessingError;
use crate::model::{Member, MemberId, PropertyDecl};
use rustc_hash::FxHashSet;

pub(crate) fn visit_members(
    scope: &TypeScope<'_>,
    acc: &mut Accumulator,
    table: &RuleTable,
) -> Result<(), ProcessingError> {
    let ignored = &scope.markers().ignored;
    let mut consumed: FxHashSet<MemberId> = FxHashSet::default();

    for prop in &scope.ty.properties {
        let view = scope.property_view(prop);
        consumed.extend(prop.members());
        if view.meta.has_stereotype(ignored) {
            for id in resolved_members(scope, prop) {
                acc.claim(id, Responsibility::Ignored);
            }
            continue;
        }
        visit_property(scope, acc, table, &view)?;
    }

    for (index, member) in scope.ty.members.iter().enumerate() {
        let id = MemberId(index);
        if consumed.contains(&id) {
            continue;
        }
        if scope.meta(id).is_some_and(|meta| meta.has_stereotype(ignored)) {
            acc.claim(id, Responsibility::Ignored);
            continue;
        }
        match member {
            Member::Field(_) => {
                if let Some(view) = scope.field_view(id) {
                    visit_field(scope, acc, table, &view)?;
                }
            }
            Member::Method(_) => {
                if let Some(view) = scope.method_view(id) {
                    visit_method(scope, acc, table.method, &view)?;
                }
            }
        }
    }
    Ok(())
}

/// Property members that exist in the type's member list
fn resolved_members(scope: &TypeScope<'_>, prop: &PropertyDecl) -> Vec<MemberId> {
    prop.members().filter(|id| scope.meta(*id).is_some()).collect()
}

fn visit_property(
    scope: &TypeScope<'_>,
    acc: &mut Accumulator,
    table: &RuleTable,
    view: &PropertyView<'_>,
) -> Result<(), ProcessingError> {
    for rule in table.property {
        if let Some(responsibility) = rule(scope, acc, view)? {
            for id in resolved_members(scope, view.prop) {
                acc.claim(id, responsibility);
            }
            return Ok(());
        }
    }

    let mut claimed = false;
    if let Some(write) = &view.write {
        for rule in table.write {
            let claim = match rule {
                WriteRule::Method(rule) => rule(scope, acc, write)?,
                WriteRule::Setter(rule) => rule(scope, acc, view, write)?,
            };
            if let Some(responsibility) = claim {
                acc.claim(write.id, responsibility);
                claimed = true;
                break;
            }
        }
    }
    if let Some(read) = &view.read {
        claimed |= visit_method(scope, acc, table.read, read)?;
    }
    if !claimed {
        if let Some(field) = &view.field {
            visit_field(scope, acc, table, field)?;
        }
    }
    Ok(())
}

fn visit_field(
    scope: &TypeScope<'_>,
    acc: &mut Accumulator,
    table: &RuleTable,
    view: &FieldView<'_>,
) -> Result<bool, ProcessingError> {
    for rule in table.field {
        if let Some(responsibility) = rule(scope, acc, view)? {
            acc.claim(view.id, responsibility);
            return Ok(true);
        }
    }
    Ok(false)
}

fn visit_method(
    scope: &TypeScope<'_>,
    acc: &mut Accumulator,
    rules: &[MethodRule],
    view: &MethodView<'_>,
) -> Result<bool, ProcessingError> {
    for rule in rules {
        if let Some(responsibility) = rule(scope, acc, view)? {
            acc.claim(view.id, responsibility);
            return Ok(true);
        }
    }
    Ok(false)
}
