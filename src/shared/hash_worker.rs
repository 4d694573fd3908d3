use async_trait::async_trait;
use bcrypt::{hash, verify, BcryptError};
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use std::sync::Arc;
use thiserror::Error;

/// bcrypt cost used for every stored password.
pub const HASH_COST: u32 = 10;

#[derive(Error, Debug)]
pub enum HashWorkerError {
  #[error("Bcrypt error: {0}")]
  Bcrypt(#[from] BcryptError),
  #[error("Thread pool error: {0}")]
  ThreadPool(#[from] ThreadPoolBuildError),
  #[error("Channel send error")]
  Send,
  #[error("Channel receive error")]
  Receive,
}

enum WorkOrder {
  Hash(String, flume::Sender<Result<String, HashWorkerError>>),
  Verify(String, String, flume::Sender<Result<bool, HashWorkerError>>),
}

/// Runs bcrypt on a dedicated rayon pool so the actix workers never block on
/// hashing.
pub struct HashWorker {
  sender: flume::Sender<WorkOrder>,
  _thread_pool: ThreadPool,
}

impl HashWorker {
  pub fn new(num_threads: usize) -> Result<Self, HashWorkerError> {
    let num_threads = num_threads.max(1);
    let thread_pool = ThreadPoolBuilder::new()
      .num_threads(num_threads)
      .thread_name(|index| format!("hash-worker-{}", index))
      .build()?;
    // Each hash takes a noticeable slice of a second; let roughly three
    // rounds of work queue up before callers wait on the channel.
    let channels_capacity = num_threads * 3;
    let (tx, rx) = flume::bounded::<WorkOrder>(channels_capacity);
    let rx = Arc::new(rx);

    for _ in 0..num_threads {
      thread_pool.spawn({
        let arc_rx = Arc::clone(&rx);
        move || {
          while let Ok(work_order) = arc_rx.recv() {
            match work_order {
              WorkOrder::Hash(password, response) => {
                let _ = response.send(
                  hash(password, HASH_COST).map_err(HashWorkerError::from),
                );
              }
              WorkOrder::Verify(password, hashed_password, response) => {
                let _ = response.send(
                  verify(password, &hashed_password)
                    .map_err(HashWorkerError::from),
                );
              }
            };
          }
        }
      });
    }

    Ok(Self {
      sender: tx,
      _thread_pool: thread_pool,
    })
  }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Hasher: Send + Sync {
  async fn hash_password(
    &self,
    password: &str,
  ) -> Result<String, HashWorkerError>;
  async fn verify_password(
    &self,
    password: &str,
    hash: &str,
  ) -> Result<bool, HashWorkerError>;
}

#[async_trait]
impl Hasher for HashWorker {
  async fn hash_password(
    &self,
    password: &str,
  ) -> Result<String, HashWorkerError> {
    let (response_tx, response_rx) = flume::bounded(1);
    self
      .sender
      .send_async(WorkOrder::Hash(password.to_string(), response_tx))
      .await
      .map_err(|_| HashWorkerError::Send)?;

    response_rx
      .recv_async()
      .await
      .map_err(|_| HashWorkerError::Receive)?
  }

  async fn verify_password(
    &self,
    password: &str,
    hash: &str,
  ) -> Result<bool, HashWorkerError> {
    let (response_tx, response_rx) = flume::bounded(1);
    self
      .sender
      .send_async(WorkOrder::Verify(
        password.to_string(),
        hash.to_string(),
        response_tx,
      ))
      .await
      .map_err(|_| HashWorkerError::Send)?;

    response_rx
      .recv_async()
      .await
      .map_err(|_| HashWorkerError::Receive)?
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use fake::{faker::internet::en::Password, Fake};

  #[actix_web::test]
  async fn test_hash_and_verify_password() {
    let hash_worker = HashWorker::new(2).expect("Failed to create hash worker");

    let password = Password(12..13).fake::<String>();

    let hashed_password = hash_worker
      .hash_password(&password)
      .await
      .expect("Hashing failed");

    // Salted hash, never the plaintext.
    assert_ne!(hashed_password, password);
    assert!(hashed_password.starts_with("$2b$10$"));

    let is_valid = hash_worker
      .verify_password(&password, &hashed_password)
      .await
      .expect("Verification failed");
    assert!(is_valid, "The password verification failed");

    let is_invalid = hash_worker
      .verify_password("wrong_password", &hashed_password)
      .await
      .expect("Verification failed for invalid password");
    assert!(!is_invalid, "The password verification should have failed");
  }

  #[actix_web::test]
  async fn test_same_password_hashes_differently() {
    let hash_worker = HashWorker::new(1).expect("Failed to create hash worker");

    let first = hash_worker.hash_password("Secret#123").await.unwrap();
    let second = hash_worker.hash_password("Secret#123").await.unwrap();
    assert_ne!(first, second);
  }
}
