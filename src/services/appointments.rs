use crate::{
    db::DbPool,
    entities::appointment::{self, AppointmentStatus, Entity as AppointmentEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    pub branch_id: Uuid,
    pub customer_id: Uuid,
    pub pet_id: Uuid,
    pub service_id: Uuid,
    #[serde(default)]
    pub doctor_id: Option<Uuid>,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleAppointmentRequest {
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub doctor_id: Option<Uuid>,
}

/// Books and manages appointments, guarding doctor slots against
/// double-booking.
#[derive(Clone)]
pub struct AppointmentService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    slot_minutes: i64,
}

impl AppointmentService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, slot_minutes: u32) -> Self {
        Self {
            db_pool,
            event_sender,
            slot_minutes: i64::from(slot_minutes),
        }
    }

    /// A doctor's slot is free when no non-cancelled appointment for that
    /// doctor falls within the slot window on either side of the requested
    /// time. Appointments without an assigned doctor never collide.
    ///
    /// Runs on the caller's connection so booking can re-check inside its own
    /// transaction. `exclude_id` lets a reschedule ignore the appointment
    /// being moved.
    pub async fn is_slot_available<C: ConnectionTrait>(
        &self,
        conn: &C,
        doctor_id: Uuid,
        scheduled_at: DateTime<Utc>,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, ServiceError> {
        let window = Duration::minutes(self.slot_minutes);
        let mut query = AppointmentEntity::find()
            .filter(appointment::Column::DoctorId.eq(doctor_id))
            .filter(appointment::Column::Status.ne(AppointmentStatus::Cancelled))
            .filter(appointment::Column::ScheduledAt.gt(scheduled_at - window))
            .filter(appointment::Column::ScheduledAt.lt(scheduled_at + window));

        if let Some(id) = exclude_id {
            query = query.filter(appointment::Column::Id.ne(id));
        }

        Ok(query.one(conn).await?.is_none())
    }

    /// Books an appointment, checking doctor availability inside the insert
    /// transaction so two concurrent requests cannot both claim the slot.
    #[instrument(skip(self, request), fields(customer_id = %request.customer_id, scheduled_at = %request.scheduled_at))]
    pub async fn book(&self, request: BookAppointmentRequest) -> Result<Uuid, ServiceError> {
        if request.branch_id.is_nil()
            || request.customer_id.is_nil()
            || request.pet_id.is_nil()
            || request.service_id.is_nil()
        {
            return Err(ServiceError::ValidationError(
                "missing required fields".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let appointment_id = Uuid::new_v4();
        let now = Utc::now();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for appointment booking");
            ServiceError::DatabaseError(e)
        })?;

        if let Some(doctor_id) = request.doctor_id {
            if !self
                .is_slot_available(&txn, doctor_id, request.scheduled_at, None)
                .await?
            {
                return Err(ServiceError::Conflict(format!(
                    "Doctor {} already has an appointment near {}",
                    doctor_id, request.scheduled_at
                )));
            }
        }

        let model = appointment::ActiveModel {
            id: Set(appointment_id),
            branch_id: Set(request.branch_id),
            customer_id: Set(request.customer_id),
            pet_id: Set(request.pet_id),
            service_id: Set(request.service_id),
            doctor_id: Set(request.doctor_id),
            scheduled_at: Set(request.scheduled_at),
            status: Set(AppointmentStatus::Booked),
            notes: Set(request.notes.clone()),
            created_at: Set(now),
            updated_at: Set(None),
        };
        model.insert(&txn).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, %appointment_id, "Failed to commit appointment booking");
            ServiceError::DatabaseError(e)
        })?;

        self.event_sender
            .send_or_log(Event::AppointmentBooked {
                appointment_id,
                doctor_id: request.doctor_id,
                scheduled_at: request.scheduled_at,
            })
            .await;

        info!(%appointment_id, "Appointment booked");
        Ok(appointment_id)
    }

    /// Moves an appointment to a new time (and optionally a new doctor).
    /// Cancelled appointments cannot be moved; the target slot is re-checked
    /// inside the update transaction, ignoring the appointment itself.
    #[instrument(skip(self))]
    pub async fn reschedule(
        &self,
        appointment_id: Uuid,
        request: RescheduleAppointmentRequest,
    ) -> Result<appointment::Model, ServiceError> {
        let db = &*self.db_pool;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for reschedule");
            ServiceError::DatabaseError(e)
        })?;

        let existing = AppointmentEntity::find_by_id(appointment_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Appointment {} not found", appointment_id))
            })?;

        if existing.status == AppointmentStatus::Cancelled {
            return Err(ServiceError::InvalidOperation(
                "Cannot reschedule a cancelled appointment".to_string(),
            ));
        }

        let doctor_id = request.doctor_id.or(existing.doctor_id);
        if let Some(doctor_id) = doctor_id {
            if !self
                .is_slot_available(&txn, doctor_id, request.scheduled_at, Some(appointment_id))
                .await?
            {
                return Err(ServiceError::Conflict(format!(
                    "Doctor {} already has an appointment near {}",
                    doctor_id, request.scheduled_at
                )));
            }
        }

        let mut update: appointment::ActiveModel = existing.into();
        update.scheduled_at = Set(request.scheduled_at);
        update.doctor_id = Set(doctor_id);
        update.updated_at = Set(Some(Utc::now()));
        let updated = update.update(&txn).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, %appointment_id, "Failed to commit reschedule");
            ServiceError::DatabaseError(e)
        })?;

        self.event_sender
            .send_or_log(Event::AppointmentRescheduled {
                appointment_id,
                scheduled_at: request.scheduled_at,
            })
            .await;

        info!(%appointment_id, scheduled_at = %request.scheduled_at, "Appointment rescheduled");
        Ok(updated)
    }

    /// Soft-cancels an appointment. The row stays; its slot is released for
    /// other bookings. Cancelling twice is a no-op error.
    #[instrument(skip(self))]
    pub async fn cancel(&self, appointment_id: Uuid) -> Result<appointment::Model, ServiceError> {
        let db = &*self.db_pool;

        let existing = AppointmentEntity::find_by_id(appointment_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Appointment {} not found", appointment_id))
            })?;

        if existing.status == AppointmentStatus::Cancelled {
            return Err(ServiceError::InvalidOperation(
                "Appointment is already cancelled".to_string(),
            ));
        }

        let mut update: appointment::ActiveModel = existing.into();
        update.status = Set(AppointmentStatus::Cancelled);
        update.updated_at = Set(Some(Utc::now()));
        let updated = update.update(db).await?;

        self.event_sender
            .send_or_log(Event::AppointmentCancelled(appointment_id))
            .await;

        info!(%appointment_id, "Appointment cancelled");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, appointment_id: Uuid) -> Result<appointment::Model, ServiceError> {
        AppointmentEntity::find_by_id(appointment_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Appointment {} not found", appointment_id))
            })
    }

    /// All appointments for a customer, soonest first.
    #[instrument(skip(self))]
    pub async fn list_for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<appointment::Model>, ServiceError> {
        let appointments = AppointmentEntity::find()
            .filter(appointment::Column::CustomerId.eq(customer_id))
            .order_by_asc(appointment::Column::ScheduledAt)
            .all(&*self.db_pool)
            .await?;
        Ok(appointments)
    }
}
