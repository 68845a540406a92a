// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]

/// sled-backed persistent store.
pub mod persistent_state;
/// Store traits, in-memory store and write-cache overlay.
pub mod store;
