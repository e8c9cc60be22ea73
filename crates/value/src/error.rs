// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Value model errors and the tag discriminant.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Discriminant naming one of the ten value tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    Absent,
    Bool,
    Int,
    UInt,
    Real,
    Text,
    Bytes,
    List,
    Map,
    Record,
}

crate::simple_display! {
    Tag {
        Absent => "absent",
        Bool => "bool",
        Int => "int",
        UInt => "uint",
        Real => "real",
        Text => "text",
        Bytes => "bytes",
        List => "list",
        Map => "map",
        Record => "record",
    }
}

/// Errors from strict value access and numeric conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("type mismatch: expected {expected}, found {found}")]
    Type { expected: Tag, found: Tag },

    #[error("value out of range for {target}: {detail}")]
    Range { target: Tag, detail: String },

    #[error("key not found: {0}")]
    Key(String),
}

impl ValueError {
    pub(crate) fn mismatch(expected: Tag, found: Tag) -> Self {
        ValueError::Type { expected, found }
    }

    pub(crate) fn range(target: Tag, detail: impl Into<String>) -> Self {
        ValueError::Range { target, detail: detail.into() }
    }
}
