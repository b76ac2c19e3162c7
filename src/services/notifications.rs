//! Loan notification queue
//!
//! Delivery happens elsewhere; this side only enqueues. Enqueueing runs on a
//! spawned task after the loan transaction has committed and its failures are
//! logged, never returned to the caller.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::NaiveDate;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use serde::{Deserialize, Serialize};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    config::{NotificationsConfig, RedisConfig},
    error::{AppError, AppResult},
    models::loan::Loan,
};

const ENQUEUE_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Message telling a member that a loan was created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanNotification {
    pub loan_id: i32,
    pub member_id: i32,
    pub book_id: i32,
    pub due_date: NaiveDate,
}

impl From<&Loan> for LoanNotification {
    fn from(loan: &Loan) -> Self {
        Self {
            loan_id: loan.id,
            member_id: loan.member_id,
            book_id: loan.book_id,
            due_date: loan.due_date,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationQueue: Send + Sync {
    async fn enqueue(&self, message: LoanNotification) -> AppResult<()>;
}

/// Redis list backed queue
#[derive(Clone)]
pub struct RedisQueue {
    conn: ConnectionManager,
    key: String,
}

impl RedisQueue {
    pub async fn connect(redis: &RedisConfig, notifications: &NotificationsConfig) -> AppResult<Self> {
        let client = Client::open(redis.url.as_str())
            .map_err(|e| AppError::Queue(format!("Failed to create Redis client: {}", e)))?;

        let mut conn = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::Queue(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Queue(format!("Redis connection test failed: {}", e)))?;

        Ok(Self {
            conn,
            key: notifications.queue_key.clone(),
        })
    }
}

#[async_trait]
impl NotificationQueue for RedisQueue {
    async fn enqueue(&self, message: LoanNotification) -> AppResult<()> {
        let payload = serde_json::to_string(&message)
            .map_err(|e| AppError::Queue(format!("Failed to encode notification: {}", e)))?;

        let mut conn = self.conn.clone();
        conn.rpush::<_, _, ()>(&self.key, payload)
            .await
            .map_err(|e| AppError::Queue(format!("Failed to push notification: {}", e)))?;
        Ok(())
    }
}

/// Channel backed queue for tests and local runs without Redis
#[derive(Clone)]
pub struct InMemoryQueue {
    sender: mpsc::UnboundedSender<LoanNotification>,
}

impl InMemoryQueue {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<LoanNotification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl NotificationQueue for InMemoryQueue {
    async fn enqueue(&self, message: LoanNotification) -> AppResult<()> {
        self.sender
            .send(message)
            .map_err(|_| AppError::Queue("Notification receiver closed".to_string()))
    }
}

/// Fire-and-forget front of a [`NotificationQueue`]
#[derive(Clone)]
pub struct NotificationDispatcher {
    queue: Arc<dyn NotificationQueue>,
}

impl NotificationDispatcher {
    pub fn new(queue: Arc<dyn NotificationQueue>) -> Self {
        Self { queue }
    }

    /// Enqueue in the background, retrying a few times before giving up
    pub fn dispatch(&self, message: LoanNotification) -> JoinHandle<()> {
        let queue = self.queue.clone();
        tokio::spawn(async move {
            for attempt in 1..=ENQUEUE_ATTEMPTS {
                match queue.enqueue(message.clone()).await {
                    Ok(()) => {
                        tracing::debug!(loan_id = message.loan_id, "Loan notification enqueued");
                        return;
                    }
                    Err(e) if attempt < ENQUEUE_ATTEMPTS => {
                        tracing::warn!(loan_id = message.loan_id, attempt, "Enqueue failed, retrying: {}", e);
                        tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                    }
                    Err(e) => {
                        tracing::warn!(loan_id = message.loan_id, "Dropping loan notification: {}", e);
                    }
                }
            }
        })
    }
}
