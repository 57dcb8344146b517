// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

//! Boolean queries over concrete specs.
//!
//! Query strings like `+romio @5: %gcc@:9 schedulers=tm` are parsed
//! once into a [`Condition`] tree which is then evaluated against
//! anything [`Queryable`].

mod condition;
mod error;
pub mod parsing;

pub use condition::{parse_condition, satisfies, Condition};
pub use error::{Error, Result};
pub use varconf_foundation as foundation;
pub use varconf_foundation::spec::Queryable;
