// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Persistent key-value state using sled. Batches commit atomically in one sled transaction.

use crate::core::state::store::{KvIter, KvRead};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use thiserror::Error;

/// State errors.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("db open")]
    DbOpen,
    #[error("db io")]
    DbIo,
    #[error("tx conflict")]
    TxConflict,
}

/// State operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KvOp {
    /// Put key/value.
    Put { key: Vec<u8>, value: Vec<u8> },
    /// Delete key.
    Del { key: Vec<u8> },
}

/// Persistent state wrapper.
#[derive(Clone)]
pub struct PersistentState {
    db: sled::Db,
}

impl PersistentState {
    /// Open sled DB at path (directory).
    pub fn open(path: &str) -> Result<Self, StateError> {
        let db = sled::open(path).map_err(|_| StateError::DbOpen)?;
        Ok(Self { db })
    }

    /// Atomic commit using sled transactions. Either every op lands or none does.
    pub fn commit_atomic(&self, ops: Vec<KvOp>) -> Result<(), StateError> {
        if ops.is_empty() {
            return Ok(());
        }
        let res: Result<(), TransactionError<StateError>> = self.db.transaction(|t| {
            for op in ops.iter() {
                let r = match op {
                    KvOp::Put { key, value } => t.insert(key.as_slice(), value.as_slice()),
                    KvOp::Del { key } => t.remove(key.as_slice()),
                };
                r.map_err(|_| ConflictableTransactionError::Abort(StateError::DbIo))?;
            }
            Ok(())
        });
        match res {
            Ok(()) => {}
            Err(TransactionError::Abort(e)) => return Err(e),
            Err(TransactionError::Storage(_)) => return Err(StateError::DbIo),
        }
        self.db.flush().map_err(|_| StateError::DbIo)?;
        Ok(())
    }
}

impl KvRead for PersistentState {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        let v = self.db.get(key).map_err(|_| StateError::DbIo)?;
        Ok(v.map(|iv| iv.to_vec()))
    }

    fn iter_prefix<'a>(&'a self, prefix: &[u8], start: Option<&[u8]>) -> KvIter<'a> {
        let prefix = prefix.to_vec();
        let lower = match start {
            Some(s) if s > prefix.as_slice() => s.to_vec(),
            _ => prefix.clone(),
        };
        Box::new(
            self.db
                .range(lower..)
                .map(|item| {
                    item.map(|(k, v)| (k.to_vec(), v.to_vec()))
                        .map_err(|_| StateError::DbIo)
                })
                .take_while(move |item| match item {
                    Ok((k, _)) => k.starts_with(&prefix),
                    Err(_) => true,
                }),
        )
    }
}
