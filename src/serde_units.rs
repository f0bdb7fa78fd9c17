// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Serde adapters that encode `qtty` quantities as bare `f64` values.
//!
//! Use with `#[serde(with = "crate::serde_units::hours")]` and friends.

macro_rules! quantity_as_f64 {
    ($module:ident, $quantity:ty) => {
        pub mod $module {
            use serde::{Deserialize, Deserializer, Serializer};

            pub fn serialize<S>(value: &$quantity, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_f64(value.value())
            }

            pub fn deserialize<'de, D>(deserializer: D) -> Result<$quantity, D::Error>
            where
                D: Deserializer<'de>,
            {
                let raw = f64::deserialize(deserializer)?;
                Ok(<$quantity>::new(raw))
            }
        }
    };
}

quantity_as_f64!(degrees, qtty::Degrees);
quantity_as_f64!(hours, qtty::Hours);
quantity_as_f64!(days, qtty::Days);
