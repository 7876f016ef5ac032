// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! HTTP management surface
//!
//! | Method | Path | Effect |
//! |---|---|---|
//! | GET | `/v1/catalog` | list stored definitions |
//! | GET | `/v1/catalog/{name}` | fetch one definition |
//! | POST | `/v1/catalog` | create or replace a definition |
//! | DELETE | `/v1/catalog/{name}` | delete a definition and its descendants |

pub mod error;
pub mod resource;
pub mod router;

pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use resource::CatalogResource;
pub use router::management_router;
