//  UNIVERSE.rs
//    by Lut99
//
//  Created:
//    05 Mar 2025, 09:12:55
//  Last edited:
//    18 Mar 2025, 14:30:41
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the closed, finite set of objects that quantifiers range
//!   over, together with the static distance table.
//

use std::collections::HashMap;

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::errors::{SchemaError, StateError};
use crate::formula::Ident;
use crate::ids::{ObjectId, TypeId};
use crate::log::debug;
use crate::schema::{Schema, TypeDef};


/***** LIBRARY *****/
/// A declared object.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ObjectDef {
    /// The name of the object.
    pub name: Ident,
    /// Its most specific type.
    pub ty:   TypeId,
}



/// The objects in the world.
///
/// Next to the objects themselves, keeps a _pool_ per type, which lists every object that is a
/// (reflexive) subtype of it in declaration order. These are the sets that quantifiers and
/// action parameters range over.
#[derive(Clone, Debug)]
pub struct Universe {
    /// The objects, by name.
    objects: IndexMap<Ident, ObjectDef>,
    /// The pools, indexed by type.
    pools:   Vec<Vec<ObjectId>>,
    /// The type table of the schema this universe was built for.
    types:   Vec<TypeDef>,
}
impl Universe {
    /// Constructor for the Universe.
    ///
    /// # Arguments
    /// - `schema`: The [`Schema`] declaring the types of the objects.
    /// - `objects`: Pairs of object names and the names of their types.
    ///
    /// # Returns
    /// A new Universe.
    ///
    /// # Errors
    /// This function errors if an object is declared twice or has an undeclared type.
    pub fn new<N, T>(schema: &Schema, objects: impl IntoIterator<Item = (N, T)>) -> Result<Self, SchemaError>
    where
        N: Into<Ident>,
        T: AsRef<str>,
    {
        let mut res: IndexMap<Ident, ObjectDef> = IndexMap::new();
        for (name, ty) in objects {
            let name: Ident = name.into();
            let ty: &str = ty.as_ref();
            let ty: TypeId =
                schema.type_id(ty).ok_or_else(|| SchemaError::UndeclaredType { context: format!("object \"{name}\""), ty: ty.to_string() })?;
            match res.entry(name.clone()) {
                Entry::Occupied(_) => return Err(SchemaError::DuplicateObject { name: name.to_string() }),
                Entry::Vacant(entry) => {
                    entry.insert(ObjectDef { name, ty });
                },
            }
        }

        // Build the pools
        let mut pools: Vec<Vec<ObjectId>> = vec![Vec::new(); schema.types().len()];
        for (i, obj) in res.values().enumerate() {
            for (ty, _) in schema.types() {
                if schema.is_subtype(obj.ty, ty) {
                    pools[ty.0].push(ObjectId(i));
                }
            }
        }
        debug!("Built universe with {} objects", res.len());
        Ok(Self { objects: res, pools, types: schema.types().map(|(_, def)| def.clone()).collect() })
    }

    /// Returns whether this universe was built for a schema with the given type table.
    ///
    /// Object types are identifiers into that table, so they're meaningless for any other.
    ///
    /// # Arguments
    /// - `schema`: The [`Schema`] to check against.
    ///
    /// # Returns
    /// True if `schema` declares the same types, with the same parents, in the same order.
    #[inline]
    pub fn is_built_for(&self, schema: &Schema) -> bool {
        self.types.len() == schema.types().len() && self.types.iter().zip(schema.types()).all(|(ours, (_, theirs))| ours == theirs)
    }



    /// Returns the identifier of the object with the given name, if any.
    #[inline]
    pub fn object_id(&self, name: &str) -> Option<ObjectId> { self.objects.get_index_of(name).map(ObjectId) }

    /// Returns the identifier of the object with the given name, ignoring case.
    ///
    /// External solvers tend to lowercase names in their output.
    #[inline]
    pub fn object_id_ignore_case(&self, name: &str) -> Option<ObjectId> {
        self.object_id(name).or_else(|| self.objects.keys().position(|n| n.eq_ignore_ascii_case(name)).map(ObjectId))
    }

    /// Returns the definition of the given object.
    ///
    /// # Panics
    /// This function panics if the identifier was not produced by this universe.
    #[inline]
    pub fn object(&self, id: ObjectId) -> &ObjectDef { &self.objects[id.0] }

    /// Returns the definition of the given object, if the identifier is valid.
    #[inline]
    pub fn get_object(&self, id: ObjectId) -> Option<&ObjectDef> { self.objects.get_index(id.0).map(|(_, def)| def) }

    /// Returns the name of the given object.
    #[inline]
    pub fn name(&self, id: ObjectId) -> &Ident { &self.objects[id.0].name }

    /// Returns the most specific type of the given object.
    #[inline]
    pub fn type_of(&self, id: ObjectId) -> TypeId { self.objects[id.0].ty }

    /// Returns all objects that are a (reflexive) subtype of the given type.
    #[inline]
    pub fn pool(&self, ty: TypeId) -> &[ObjectId] { self.pools.get(ty.0).map(Vec::as_slice).unwrap_or(&[]) }

    /// Returns all objects in declaration order.
    #[inline]
    pub fn objects(&self) -> impl '_ + ExactSizeIterator<Item = (ObjectId, &ObjectDef)> {
        self.objects.values().enumerate().map(|(i, o)| (ObjectId(i), o))
    }

    /// Returns the number of objects.
    #[inline]
    pub fn len(&self) -> usize { self.objects.len() }

    /// Returns the number of types in the schema this universe was built for.
    #[inline]
    pub fn n_types(&self) -> usize { self.types.len() }

    /// Returns whether there are no objects.
    #[inline]
    pub fn is_empty(&self) -> bool { self.objects.is_empty() }
}



/// The static table of distances between objects, looked up by `(distance a b)` cost
/// expressions.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Distances {
    table: HashMap<(ObjectId, ObjectId), i64>,
}
impl Distances {
    /// Constructor for the Distances that initializes it empty.
    #[inline]
    pub fn new() -> Self { Self::default() }

    /// Builds a table from named entries.
    ///
    /// # Arguments
    /// - `universe`: The [`Universe`] to resolve names in.
    /// - `entries`: Triples of `(from, to, distance)`. Entries are directed; use
    ///   [`Distances::insert_symmetric()`] or list both directions for undirected ones.
    ///
    /// # Returns
    /// A new Distances.
    ///
    /// # Errors
    /// This function errors if any of the names isn't an object.
    pub fn from_names<'n>(universe: &Universe, entries: impl IntoIterator<Item = (&'n str, &'n str, i64)>) -> Result<Self, StateError> {
        let mut res: Self = Self::new();
        for (from, to, dist) in entries {
            let from: ObjectId = universe.object_id(from).ok_or_else(|| StateError::UnknownObject { name: from.into() })?;
            let to: ObjectId = universe.object_id(to).ok_or_else(|| StateError::UnknownObject { name: to.into() })?;
            res.insert(from, to, dist);
        }
        Ok(res)
    }

    /// Sets the distance from one object to another.
    #[inline]
    pub fn insert(&mut self, from: ObjectId, to: ObjectId, dist: i64) { self.table.insert((from, to), dist); }

    /// Sets the distance between two objects in both directions.
    #[inline]
    pub fn insert_symmetric(&mut self, a: ObjectId, b: ObjectId, dist: i64) {
        self.insert(a, b, dist);
        self.insert(b, a, dist);
    }

    /// Returns the distance from one object to another, if any.
    #[inline]
    pub fn get(&self, from: ObjectId, to: ObjectId) -> Option<i64> { self.table.get(&(from, to)).copied() }

    /// Returns all entries, sorted by object.
    #[inline]
    pub fn entries(&self) -> Vec<(ObjectId, ObjectId, i64)> {
        let mut res: Vec<(ObjectId, ObjectId, i64)> = self.table.iter().map(|((a, b), d)| (*a, *b, *d)).collect();
        res.sort();
        res
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize { self.table.len() }

    /// Returns whether there are no entries.
    #[inline]
    pub fn is_empty(&self) -> bool { self.table.is_empty() }
}





/***** TESTS *****/
