use std::sync::Arc;

use chrono::Utc;
use common::storage::{ObjectKey, ObjectStore};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::entity::{crack, egg, egg_crack, user_crack};
use crate::error::AppError;
use crate::inference::Classification;

/// Input for registering one detected crack.
pub struct NewFinding {
    pub user_id: String,
    /// The submitted photo reference, stored verbatim for provenance.
    pub source_ref: String,
    /// PNG-encoded cut-out produced by the post-processor.
    pub segment_png: Vec<u8>,
    pub classification: Classification,
    pub latitude: f64,
    pub longitude: f64,
}

pub struct RegisteredFinding {
    pub crack_id: i32,
    pub segment_url: String,
}

/// Aggregate view of one user's egg.
pub struct EggAggregate {
    pub egg_id: Uuid,
    pub count: u64,
    /// Cut-out URLs in insertion order.
    pub segment_urls: Vec<String>,
}

/// Data access for cracks, eggs and their links.
///
/// Every multi-row write runs in one transaction, so a crack row can never
/// exist without its egg link. Blob uploads happen before the transaction:
/// a rollback can orphan an uploaded cut-out, which is garbage to sweep,
/// never a corrupted aggregate.
#[derive(Clone)]
pub struct FindingRepository {
    db: DatabaseConnection,
    store: Arc<dyn ObjectStore>,
}

impl FindingRepository {
    pub fn new(db: DatabaseConnection, store: Arc<dyn ObjectStore>) -> Self {
        Self { db, store }
    }

    /// Create the user's egg. Eggs are provisioned once; a second call
    /// reports `Conflict` (unique violation caught on insert, so two
    /// racing provisions cannot both succeed).
    #[instrument(skip(self))]
    pub async fn provision_egg(&self, user_id: &str) -> Result<egg::Model, AppError> {
        let model = egg::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id.to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        model.insert(&self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("User already has an active egg".into())
            }
            _ => AppError::from(e),
        })
    }

    /// Resolve the user's egg. Exactly one row can exist thanks to the
    /// unique index on `user_id`; absence is `NotFound`, never an
    /// implicit creation.
    pub async fn find_egg(&self, user_id: &str) -> Result<egg::Model, AppError> {
        egg::Entity::find()
            .filter(egg::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("No active egg for this user".into()))
    }

    /// Register a detected crack: upload the cut-out, then insert the
    /// crack row plus both link rows in one transaction.
    ///
    /// The egg is resolved first so a user without one fails before any
    /// side effect. Blob keys embed a UUIDv7, so concurrent registrations
    /// for the same user can never collide on a path.
    #[instrument(skip(self, finding), fields(user_id = %finding.user_id))]
    pub async fn register_finding(
        &self,
        finding: NewFinding,
    ) -> Result<RegisteredFinding, AppError> {
        let egg = self.find_egg(&finding.user_id).await?;

        let key = ObjectKey::segment(&finding.user_id, Uuid::now_v7())
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.store
            .put(&key, &finding.segment_png, "image/png")
            .await?;
        let segment_url = self.store.public_url(&key)?;

        let txn = self.db.begin().await?;

        let crack_row = crack::ActiveModel {
            img_url: Set(finding.source_ref),
            seg_url: Set(segment_url.clone()),
            crack_type: Set(finding.classification.crack_type.as_str().to_string()),
            severity: Set(i16::from(finding.classification.severity.value())),
            latitude: Set(finding.latitude),
            longitude: Set(finding.longitude),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        egg_crack::ActiveModel {
            egg_id: Set(egg.id),
            crack_id: Set(crack_row.id),
            linked_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        user_crack::ActiveModel {
            user_id: Set(finding.user_id.clone()),
            crack_id: Set(crack_row.id),
            linked_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(crack_id = crack_row.id, "registered crack finding");
        Ok(RegisteredFinding {
            crack_id: crack_row.id,
            segment_url,
        })
    }

    /// Link a crack into the user's egg and return the egg's full list of
    /// cut-out URLs.
    ///
    /// Idempotent: `register_finding` already links inside its
    /// transaction, so this insert tolerates the existing row instead of
    /// double-counting it.
    #[instrument(skip(self))]
    pub async fn record_in_egg(
        &self,
        user_id: &str,
        crack_id: i32,
    ) -> Result<Vec<String>, AppError> {
        let egg = self.find_egg(user_id).await?;

        let link = egg_crack::ActiveModel {
            egg_id: Set(egg.id),
            crack_id: Set(crack_id),
            linked_at: Set(Utc::now()),
            ..Default::default()
        };
        let result = egg_crack::Entity::insert(link)
            .on_conflict(
                OnConflict::columns([egg_crack::Column::EggId, egg_crack::Column::CrackId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await;
        match result {
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e.into()),
        }

        self.segment_urls(egg.id).await
    }

    /// Aggregate view of the user's egg.
    pub async fn aggregate(&self, user_id: &str) -> Result<EggAggregate, AppError> {
        let egg = self.find_egg(user_id).await?;
        let segment_urls = self.segment_urls(egg.id).await?;
        Ok(EggAggregate {
            egg_id: egg.id,
            count: segment_urls.len() as u64,
            segment_urls,
        })
    }

    /// Tear down the user's aggregate: remove every egg link. Crack rows,
    /// user links and uploaded blobs stay behind as audit trail. A user
    /// without an egg is a successful no-op.
    #[instrument(skip(self))]
    pub async fn delete_user_data(&self, user_id: &str) -> Result<u64, AppError> {
        let Some(egg) = egg::Entity::find()
            .filter(egg::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
        else {
            return Ok(0);
        };

        let result = egg_crack::Entity::delete_many()
            .filter(egg_crack::Column::EggId.eq(egg.id))
            .exec(&self.db)
            .await?;

        info!(removed = result.rows_affected, "reset egg links");
        Ok(result.rows_affected)
    }

    /// Cut-out URLs for an egg. Crack ids are assigned in insertion
    /// order, which makes this the stable aggregate order.
    async fn segment_urls(&self, egg_id: Uuid) -> Result<Vec<String>, AppError> {
        let links = egg_crack::Entity::find()
            .filter(egg_crack::Column::EggId.eq(egg_id))
            .order_by_asc(egg_crack::Column::CrackId)
            .all(&self.db)
            .await?;
        let crack_ids: Vec<i32> = links.into_iter().map(|l| l.crack_id).collect();

        let cracks = crack::Entity::find()
            .filter(crack::Column::Id.is_in(crack_ids))
            .order_by_asc(crack::Column::Id)
            .all(&self.db)
            .await?;

        Ok(cracks.into_iter().map(|c| c.seg_url).collect())
    }
}
