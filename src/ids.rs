//  IDS.rs
//    by Lut99
//
//  Created:
//    03 Mar 2025, 10:31:50
//  Last edited:
//    07 Mar 2025, 14:55:02
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the index types that refer to declarations in a
//!   [`Schema`](crate::schema::Schema) or [`Universe`](crate::universe::Universe).
//


/***** HELPER MACROS *****/
/// Generates an opaque identifier for some kind of declaration.
macro_rules! id_type {
    ($name:ident, $what:literal, $table:literal) => {
        paste::paste! {
            #[doc = concat!("Identifies a ", $what, " by its position in the ", $table, ".\n\nIdentifiers are only meaningful in combination with the table that produced them.")]
            #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
            pub struct [<$name Id>](pub(crate) usize);
            impl [<$name Id>] {
                #[doc = concat!("Returns the position of the ", $what, " in the ", $table, ".\n\n# Returns\nA [`usize`] index.")]
                #[inline]
                pub const fn index(&self) -> usize { self.0 }
            }
        }
    };
}





/***** LIBRARY *****/
id_type!(Type, "type", "schema's type table");
id_type!(Predicate, "predicate", "schema's predicate table");
id_type!(Action, "action schema", "schema's action table");
id_type!(Object, "object", "universe");
