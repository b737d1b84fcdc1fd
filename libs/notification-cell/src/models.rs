use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const NO_PRESCRIPTION_PLACEHOLDER: &str = "No prescription provided";
const UNSCHEDULED_PLACEHOLDER: &str = "To be scheduled";
const SIGNATURE: &str = "Thank you,\nMediBook Pro Team";

/// Appointment event a patient is told about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationKind {
    Booked {
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
    },
    Confirmed {
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
    },
    Cancelled {
        date: Option<NaiveDate>,
    },
    Completed {
        prescription: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_email: String,
    pub recipient_name: String,
    pub doctor_name: String,
    pub kind: NotificationKind,
    pub created_at: DateTime<Utc>,
}

/// Subject and plain-text body ready for a transport.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RenderedMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn new(recipient_email: &str, recipient_name: &str, doctor_name: &str, kind: NotificationKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient_email: recipient_email.to_string(),
            recipient_name: recipient_name.to_string(),
            doctor_name: doctor_name.to_string(),
            kind,
            created_at: Utc::now(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self.kind {
            NotificationKind::Booked { .. } => "booked",
            NotificationKind::Confirmed { .. } => "confirmed",
            NotificationKind::Cancelled { .. } => "cancelled",
            NotificationKind::Completed { .. } => "completed",
        }
    }

    pub fn subject(&self) -> String {
        let title = match self.kind {
            NotificationKind::Booked { .. } => "Appointment Booked",
            NotificationKind::Confirmed { .. } => "Appointment Confirmed",
            NotificationKind::Cancelled { .. } => "Appointment Cancelled",
            NotificationKind::Completed { .. } => "Appointment Completed",
        };
        format!("{} - MediBook Pro", title)
    }

    pub fn body(&self) -> String {
        let greeting = format!("Dear {},", self.recipient_name);

        let content = match &self.kind {
            NotificationKind::Booked { date, time } => format!(
                "Your appointment has been booked successfully!\n\n{}\n\nPlease arrive 10 minutes early.",
                self.details(date, time)
            ),
            NotificationKind::Confirmed { date, time } => format!(
                "Great news! Your appointment has been confirmed.\n\n{}",
                self.details(date, time)
            ),
            NotificationKind::Cancelled { date } => format!(
                "Your appointment with Dr. {} on {} has been cancelled.\n\nYou can book a new appointment anytime.",
                self.doctor_name,
                format_date(date)
            ),
            NotificationKind::Completed { prescription } => format!(
                "Your appointment with Dr. {} has been completed.\n\nPrescription:\n{}\n\nGet well soon!",
                self.doctor_name,
                prescription.as_deref().unwrap_or(NO_PRESCRIPTION_PLACEHOLDER)
            ),
        };

        format!("{}\n\n{}\n\n{}", greeting, content, SIGNATURE)
    }

    pub fn render(&self) -> RenderedMessage {
        RenderedMessage {
            to: self.recipient_email.clone(),
            subject: self.subject(),
            body: self.body(),
        }
    }

    fn details(&self, date: &Option<NaiveDate>, time: &Option<NaiveTime>) -> String {
        format!(
            "Details:\nDoctor: Dr. {}\nDate: {}\nTime: {}",
            self.doctor_name,
            format_date(date),
            time.map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| UNSCHEDULED_PLACEHOLDER.to_string())
        )
    }
}

fn format_date(date: &Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| UNSCHEDULED_PLACEHOLDER.to_string())
}
