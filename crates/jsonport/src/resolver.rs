// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Resolution of declared-type expressions into shape descriptors.
//!
//! Resolution is lazy and memoized: a named type is inspected the first time
//! a conversion needs it, and the resulting descriptor is cached. Two caches
//! back the resolver — one keyed by type name for registered records and
//! enumerations, one keyed by the whole expression for optional/union
//! hints. Both are pure memoization; an evicted entry is recomputed from the
//! registry declaration on the next lookup.

use std::sync::Arc;

use crate::cache::{DescriptorCache, LookupStats};
use crate::descriptor::{
    EnumDescriptor, EnumMember, FieldDescriptor, MapDescriptor, RecordDescriptor, TupleDescriptor,
    TypeDescriptor, TypeKind,
};
use crate::error::ResolveError;
use crate::schema::{EnumDecl, RecordDecl, SchemaRegistry, TypeDecl, TypeExpr};

/// Default capacity of the named-type descriptor cache.
pub const NAMED_CACHE_CAPACITY: usize = 1024;
/// Default capacity of the optional/union hint cache.
pub const HINT_CACHE_CAPACITY: usize = 512;

/// Snapshot of both cache counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheStats {
    pub named: LookupStats,
    pub hints: LookupStats,
}

/// Resolves [`TypeExpr`] declarations into immutable [`TypeDescriptor`]s.
pub struct TypeResolver {
    named: DescriptorCache<String>,
    hints: DescriptorCache<TypeExpr>,
}

impl TypeResolver {
    /// Create a resolver with the default cache capacities.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacities(NAMED_CACHE_CAPACITY, HINT_CACHE_CAPACITY)
    }

    /// Create a resolver with explicit cache capacities.
    #[must_use]
    pub fn with_capacities(named: usize, hints: usize) -> Self {
        Self {
            named: DescriptorCache::new(named),
            hints: DescriptorCache::new(hints),
        }
    }

    /// Resolve a declared-type expression to its shape descriptor.
    pub fn resolve(
        &self,
        expr: &TypeExpr,
        registry: &SchemaRegistry,
    ) -> Result<Arc<TypeDescriptor>, ResolveError> {
        match expr {
            TypeExpr::Named(name) => self.resolve_named(name, registry),
            TypeExpr::Optional(_) | TypeExpr::Union(_) => self
                .hints
                .get_or_resolve(expr.clone(), || self.build_hint(expr, registry)),
            _ => self.build(expr, registry),
        }
    }

    /// Resolve a registered record or enumeration by name. This is also the
    /// entry the conversion engine uses when it reaches a by-name reference.
    pub fn resolve_named(
        &self,
        name: &str,
        registry: &SchemaRegistry,
    ) -> Result<Arc<TypeDescriptor>, ResolveError> {
        self.named
            .get_or_resolve(name.to_string(), || match registry.get(name) {
                Some(TypeDecl::Record(decl)) => self.build_record(decl, registry),
                Some(TypeDecl::Enum(decl)) => Ok(build_enum(decl)),
                None => Err(ResolveError::UnknownType(name.to_string())),
            })
    }

    /// Snapshot of both cache counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            named: self.named.stats(),
            hints: self.hints.stats(),
        }
    }

    /// Drop all cached descriptors; later lookups recompute them.
    pub fn clear(&self) {
        self.named.clear();
        self.hints.clear();
    }

    fn build(
        &self,
        expr: &TypeExpr,
        registry: &SchemaRegistry,
    ) -> Result<Arc<TypeDescriptor>, ResolveError> {
        let kind = match expr {
            TypeExpr::Str => TypeKind::Str,
            TypeExpr::Int => TypeKind::Int,
            TypeExpr::Float => TypeKind::Float,
            TypeExpr::Bool => TypeKind::Bool,
            TypeExpr::Null => TypeKind::Null,
            TypeExpr::DateTime => TypeKind::DateTime,
            TypeExpr::Date => TypeKind::Date,
            TypeExpr::Time => TypeKind::Time,
            TypeExpr::Named(name) => return self.resolve_named(name, registry),
            TypeExpr::Optional(_) | TypeExpr::Union(_) => {
                return self.resolve(expr, registry);
            }
            TypeExpr::List(elem) => TypeKind::List(self.resolve_nested(elem, registry)?),
            TypeExpr::Set(elem) => TypeKind::Set(self.resolve_nested(elem, registry)?),
            TypeExpr::Tuple(items) => {
                let slots = items
                    .iter()
                    .map(|item| self.resolve_nested(item, registry))
                    .collect::<Result<Vec<_>, _>>()?;
                TypeKind::Tuple(TupleDescriptor::Fixed(slots))
            }
            TypeExpr::TupleOf(elem) => {
                TypeKind::Tuple(TupleDescriptor::Variadic(self.resolve_nested(elem, registry)?))
            }
            TypeExpr::Map(key, value) => {
                let key = self.resolve_nested(key, registry)?;
                self.check_map_key(&key, registry)?;
                TypeKind::Map(MapDescriptor {
                    key,
                    value: self.resolve_nested(value, registry)?,
                })
            }
        };
        Ok(Arc::new(TypeDescriptor::new(expr.to_string(), kind)))
    }

    /// Resolve an expression appearing inside another type. A named
    /// reference stays by-name here, which keeps descriptors finite for
    /// self- and mutually-recursive record declarations.
    fn resolve_nested(
        &self,
        expr: &TypeExpr,
        registry: &SchemaRegistry,
    ) -> Result<Arc<TypeDescriptor>, ResolveError> {
        match expr {
            TypeExpr::Named(name) => Ok(Arc::new(TypeDescriptor::new(
                name.clone(),
                TypeKind::Ref(name.clone()),
            ))),
            TypeExpr::Optional(_) | TypeExpr::Union(_) => self
                .hints
                .get_or_resolve(expr.clone(), || self.build_hint(expr, registry)),
            _ => self.build(expr, registry),
        }
    }

    fn build_hint(
        &self,
        expr: &TypeExpr,
        registry: &SchemaRegistry,
    ) -> Result<Arc<TypeDescriptor>, ResolveError> {
        match expr {
            TypeExpr::Optional(inner) => {
                let inner = self.resolve_nested(inner, registry)?;
                Ok(Arc::new(TypeDescriptor::new(
                    format!("optional<{}>", inner.name),
                    TypeKind::Optional(inner),
                )))
            }
            TypeExpr::Union(alternatives) => {
                // Null alternatives collapse into an optional wrapper, so
                // `Union[T, None]` and `Optional[T]` resolve identically.
                let non_null: Vec<&TypeExpr> = alternatives
                    .iter()
                    .filter(|alt| !matches!(alt, TypeExpr::Null))
                    .collect();
                let has_null = non_null.len() != alternatives.len();

                let inner = match non_null.len() {
                    0 => return Ok(Arc::new(TypeDescriptor::new("null", TypeKind::Null))),
                    1 => self.resolve_nested(non_null[0], registry)?,
                    _ => {
                        let names: Vec<String> =
                            non_null.iter().map(|alt| alt.to_string()).collect();
                        let resolved = non_null
                            .iter()
                            .map(|alt| self.resolve_nested(alt, registry))
                            .collect::<Result<Vec<_>, _>>()?;
                        Arc::new(TypeDescriptor::new(
                            format!("union<{}>", names.join(" | ")),
                            TypeKind::Union(resolved),
                        ))
                    }
                };

                if has_null {
                    Ok(Arc::new(TypeDescriptor::new(
                        format!("optional<{}>", inner.name),
                        TypeKind::Optional(inner),
                    )))
                } else {
                    Ok(inner)
                }
            }
            other => self.build(other, registry),
        }
    }

    fn build_record(
        &self,
        decl: &RecordDecl,
        registry: &SchemaRegistry,
    ) -> Result<Arc<TypeDescriptor>, ResolveError> {
        let mut fields = Vec::with_capacity(decl.fields.len());
        for field in &decl.fields {
            fields.push(FieldDescriptor {
                name: field.name.clone(),
                descriptor: self.resolve_nested(&field.expr, registry)?,
                default: field.default.clone(),
            });
        }
        Ok(Arc::new(TypeDescriptor::new(
            decl.name.clone(),
            TypeKind::Record(RecordDescriptor {
                name: decl.name.clone(),
                fields,
            }),
        )))
    }

    /// A map key must stringify reversibly: scalars, date/time values and
    /// enumerations qualify, containers and records do not.
    fn check_map_key(
        &self,
        key: &Arc<TypeDescriptor>,
        registry: &SchemaRegistry,
    ) -> Result<(), ResolveError> {
        let ok = match &key.kind {
            TypeKind::Str
            | TypeKind::Int
            | TypeKind::Float
            | TypeKind::Bool
            | TypeKind::DateTime
            | TypeKind::Date
            | TypeKind::Time
            | TypeKind::Enum(_) => true,
            TypeKind::Ref(name) => {
                matches!(self.resolve_named(name, registry)?.kind, TypeKind::Enum(_))
            }
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(ResolveError::InvalidMapKey {
                key_type: key.name.clone(),
            })
        }
    }
}

impl Default for TypeResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn build_enum(decl: &EnumDecl) -> Arc<TypeDescriptor> {
    let members = decl
        .members
        .iter()
        .map(|(name, value)| EnumMember {
            name: name.clone(),
            value: value.clone(),
        })
        .collect();
    Arc::new(TypeDescriptor::new(
        decl.name.clone(),
        TypeKind::Enum(EnumDescriptor {
            name: decl.name.clone(),
            members,
        }),
    ))
}
