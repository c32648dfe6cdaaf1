use crate::{
    db::DbPool,
    entities::{
        customer::Entity as CustomerEntity,
        pet::{self, Entity as PetEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPetRequest {
    pub customer_id: Uuid,
    #[validate(length(min = 1, message = "Pet name cannot be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "Species cannot be empty"))]
    pub species: String,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub sex: Option<String>,
}

#[derive(Clone)]
pub struct PetService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl PetService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Registers a pet under an existing customer. An unknown owner is a
    /// `NotFound`, not a foreign key blowup.
    #[instrument(skip(self, request), fields(customer_id = %request.customer_id))]
    pub async fn register_pet(&self, request: RegisterPetRequest) -> Result<Uuid, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;

        CustomerEntity::find_by_id(request.customer_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Customer {} not found", request.customer_id))
            })?;

        let pet_id = Uuid::new_v4();
        let model = pet::ActiveModel {
            id: Set(pet_id),
            customer_id: Set(request.customer_id),
            name: Set(request.name),
            species: Set(request.species),
            breed: Set(request.breed),
            birth_date: Set(request.birth_date),
            sex: Set(request.sex),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        model.insert(db).await?;

        self.event_sender
            .send_or_log(Event::PetRegistered(pet_id))
            .await;

        info!(%pet_id, "Pet registered");
        Ok(pet_id)
    }

    #[instrument(skip(self))]
    pub async fn get_pet(&self, pet_id: Uuid) -> Result<pet::Model, ServiceError> {
        PetEntity::find_by_id(pet_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Pet {} not found", pet_id)))
    }

    #[instrument(skip(self))]
    pub async fn list_for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<pet::Model>, ServiceError> {
        let pets = PetEntity::find()
            .filter(pet::Column::CustomerId.eq(customer_id))
            .order_by_asc(pet::Column::Name)
            .all(&*self.db_pool)
            .await?;
        Ok(pets)
    }
}
