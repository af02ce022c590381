// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Resource catalogue

pub mod flatten;
pub mod kinds;
pub mod properties;

pub use self::flatten::{flatten, flatten_all, items, Row};
pub use self::kinds::{
    CellFormat, Column, ParentIds, ResourceKind, Tracking, UpdateMethod, Verb,
};
pub use self::properties::{build_properties, parse_properties};
