//! Value shape checking (`is-like-type`).
//!
//! A mutable container's declared type is only an upper bound on what it
//! may hold, so it can match a target its declared type is not an is-type
//! of. `ShapeChecker` first tries is-type on the declared type and only walks
//! the live contents when that fails.
//!
//! Every container visit is guarded by a (container, target) pair, so a value
//! that contains itself terminates. A pair met again while in progress is
//! assumed to match.

use crate::db::TypeDatabase;
use crate::recursion::{DepthCounter, RecursionGuard, RecursionResult};
use crate::relation_queries::RelationPolicy;
use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::{
    ArraySize, ArrayType, IntrinsicKind, LiteralSetId, RecordShape, TypeData, TypeId, TypeListId,
};
use crate::values::{ContainerKind, HeapObject, RefId, Value, ValueStore, type_of};
use rtc_common::limits;
use std::sync::Arc;
use tracing::trace;

pub struct ShapeChecker<'a> {
    interner: &'a dyn TypeDatabase,
    store: &'a dyn ValueStore,
    policy: RelationPolicy,
    guard: RecursionGuard<(RefId, TypeId)>,
    depth: DepthCounter,
    subtype_exceeded: bool,
}

impl<'a> ShapeChecker<'a> {
    pub fn new(interner: &'a dyn TypeDatabase, store: &'a dyn ValueStore) -> Self {
        Self::with_policy(interner, store, RelationPolicy::default())
    }

    pub fn with_policy(
        interner: &'a dyn TypeDatabase,
        store: &'a dyn ValueStore,
        policy: RelationPolicy,
    ) -> Self {
        let profile = policy.shape_profile();
        ShapeChecker {
            interner,
            store,
            policy,
            guard: RecursionGuard::with_profile(profile),
            depth: DepthCounter::with_profile(profile),
            subtype_exceeded: false,
        }
    }

    /// Whether the current contents of `value` fit `target`.
    pub fn is_like_type(&mut self, value: &Value, target: TypeId) -> bool {
        self.check_like(value, target).is_true()
    }

    pub fn depth_exceeded(&self) -> bool {
        self.subtype_exceeded || self.guard.is_exceeded() || self.depth.is_exceeded()
    }

    pub fn check_like(&mut self, value: &Value, target: TypeId) -> SubtypeResult {
        let Some(source) = type_of(value, self.store) else {
            return SubtypeResult::False;
        };
        let mut subtype = SubtypeChecker::with_policy(self.interner, &self.policy);
        if subtype.is_type(source, target) {
            return SubtypeResult::True;
        }
        self.subtype_exceeded |= subtype.depth_exceeded();

        if !self.depth.enter() {
            trace!(target = target.0, "is-like-type depth exceeded");
            return SubtypeResult::DepthExceeded;
        }
        let result = stacker::maybe_grow(limits::STACK_RED_ZONE, limits::STACK_GROWTH_SIZE, || {
            self.check_like_inner(value, target)
        });
        self.depth.leave();
        result
    }

    fn check_like_inner(&mut self, value: &Value, target: TypeId) -> SubtypeResult {
        let Some(target_data) = self.interner.lookup(target) else {
            return SubtypeResult::False;
        };
        match target_data {
            TypeData::Record(shape) => {
                let shape = self.interner.record_shape(shape);
                self.check_like_record(value, target, &shape)
            }
            TypeData::Intrinsic(IntrinsicKind::Json) => self.check_like_json(value, target),
            TypeData::Intrinsic(IntrinsicKind::Anydata) => {
                trace!("anydata target is not supported");
                SubtypeResult::False
            }
            TypeData::Map(constraint) => self.check_like_map(value, target, constraint),
            TypeData::Array(array) => self.check_like_array(value, target, array),
            TypeData::Tuple(members) => self.check_like_tuple(value, target, members),
            TypeData::Union(members) => self.check_like_union(value, members),
            TypeData::Finite(values) => self.check_like_finite(value, values),
            _ => SubtypeResult::False,
        }
    }

    /// Resolve `value` to a container of one of `kinds` and run `check` on it
    /// with the (container, target) pair in progress.
    fn with_container(
        &mut self,
        value: &Value,
        target: TypeId,
        kinds: &[ContainerKind],
        check: impl FnOnce(&mut Self, &'a HeapObject) -> SubtypeResult,
    ) -> SubtypeResult {
        let Some(r) = value.as_ref_id() else {
            return SubtypeResult::False;
        };
        let store = self.store;
        let Some(object) = store.object(r) else {
            return SubtypeResult::False;
        };
        if !kinds.contains(&object.kind()) {
            return SubtypeResult::False;
        }

        let key = (r, target);
        match self.guard.enter(key) {
            RecursionResult::Entered => {
                let result = check(self, object);
                self.guard.leave(key);
                result
            }
            RecursionResult::Cycle => {
                trace!(value = r.index(), target = target.0, "is-like-type cycle assumed related");
                SubtypeResult::CycleDetected
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                SubtypeResult::DepthExceeded
            }
        }
    }

    /// Each value must fit its paired target; stops at the first that does not.
    fn all_like<'v>(
        &mut self,
        pairs: impl IntoIterator<Item = (&'v Value, TypeId)>,
    ) -> SubtypeResult {
        for (value, target) in pairs {
            let result = self.check_like(value, target);
            if result.is_false() {
                return result;
            }
        }
        SubtypeResult::True
    }

    fn check_like_record(
        &mut self,
        value: &Value,
        target: TypeId,
        shape: &RecordShape,
    ) -> SubtypeResult {
        self.with_container(
            value,
            target,
            &[ContainerKind::Record, ContainerKind::Map],
            |this, object| {
                let Some(entries) = object.entries() else {
                    return SubtypeResult::False;
                };
                let missing_required = shape
                    .fields
                    .iter()
                    .any(|field| !field.is_optional() && !entries.contains_key(&field.name));
                if missing_required {
                    return SubtypeResult::False;
                }

                for (key, held) in entries {
                    let field_type = match shape.find_field(*key) {
                        Some(field) => field.type_id,
                        None if !shape.sealed => shape.rest_type(),
                        None => {
                            trace!(target = target.0, "extra key on a sealed record");
                            return SubtypeResult::False;
                        }
                    };
                    let result = this.check_like(held, field_type);
                    if result.is_false() {
                        return result;
                    }
                }
                SubtypeResult::True
            },
        )
    }

    /// A json value is a json scalar or a container whose every entry or
    /// element is again json.
    fn check_like_json(&mut self, value: &Value, target: TypeId) -> SubtypeResult {
        self.with_container(
            value,
            target,
            &[
                ContainerKind::Array,
                ContainerKind::Tuple,
                ContainerKind::Map,
                ContainerKind::Record,
            ],
            |this, object| match (object.entries(), object.elements()) {
                (Some(entries), _) => this.all_like(entries.values().map(|v| (v, TypeId::JSON))),
                (_, Some(elements)) => this.all_like(elements.iter().map(|v| (v, TypeId::JSON))),
                _ => SubtypeResult::False,
            },
        )
    }

    fn check_like_map(&mut self, value: &Value, target: TypeId, constraint: TypeId) -> SubtypeResult {
        self.with_container(
            value,
            target,
            &[ContainerKind::Map, ContainerKind::Record],
            |this, object| match object.entries() {
                Some(entries) => this.all_like(entries.values().map(|v| (v, constraint))),
                None => SubtypeResult::False,
            },
        )
    }

    fn check_like_array(&mut self, value: &Value, target: TypeId, array: ArrayType) -> SubtypeResult {
        self.with_container(
            value,
            target,
            &[ContainerKind::Array, ContainerKind::Tuple],
            |this, object| {
                let Some(elements) = object.elements() else {
                    return SubtypeResult::False;
                };
                if let ArraySize::Fixed(size) = array.size {
                    if elements.len() != size as usize {
                        return SubtypeResult::False;
                    }
                }
                this.all_like(elements.iter().map(|v| (v, array.element)))
            },
        )
    }

    fn check_like_tuple(
        &mut self,
        value: &Value,
        target: TypeId,
        members: TypeListId,
    ) -> SubtypeResult {
        let members: Arc<[TypeId]> = self.interner.type_list(members);
        self.with_container(
            value,
            target,
            &[ContainerKind::Array, ContainerKind::Tuple],
            |this, object| {
                let Some(elements) = object.elements() else {
                    return SubtypeResult::False;
                };
                if elements.len() != members.len() {
                    return SubtypeResult::False;
                }
                this.all_like(elements.iter().zip(members.iter().copied()))
            },
        )
    }

    fn check_like_union(&mut self, value: &Value, members: TypeListId) -> SubtypeResult {
        let members = self.interner.type_list(members);
        let mut exceeded = false;
        for &member in members.iter() {
            match self.check_like(value, member) {
                result if result.is_true() => return result,
                SubtypeResult::DepthExceeded => exceeded = true,
                _ => {}
            }
        }
        if exceeded {
            SubtypeResult::DepthExceeded
        } else {
            SubtypeResult::False
        }
    }

    /// Literal membership: same dynamic type and equal by value.
    fn check_like_finite(&mut self, value: &Value, values: LiteralSetId) -> SubtypeResult {
        let Some(literal) = value.as_literal() else {
            return SubtypeResult::False;
        };
        let values = self.interner.literal_set(values);
        values
            .iter()
            .any(|member| member.type_id() == literal.type_id() && *member == literal)
            .into()
    }
}

/// One-shot is-like-type query with default limits.
pub fn is_like_type(
    interner: &dyn TypeDatabase,
    store: &dyn ValueStore,
    value: &Value,
    target: TypeId,
) -> bool {
    ShapeChecker::new(interner, store).is_like_type(value, target)
}

#[cfg(test)]
#[path = "../tests/shape_tests.rs"]
mod tests;
