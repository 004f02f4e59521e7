use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::random::RandomSource;

pub const DEMO_SLOTS: [&str; 10] = [
    "09:00", "10:00", "11:00", "12:00", "14:00", "15:00", "16:00", "17:00", "18:00", "19:00",
];

const MIN_SLOTS: u64 = 3;
const MAX_SLOTS: u64 = 7;

#[derive(Debug, Clone, Serialize)]
pub struct DemoBooking {
    pub booking_id: String,
    pub user_id: String,
    pub service: String,
    pub date: String,
    pub time: String,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
}

/// Placeholder availability: the first 3 to 7 slots of the day, any date.
pub fn available_slots(random: &dyn RandomSource) -> Vec<&'static str> {
    let count = MIN_SLOTS + random.below(MAX_SLOTS - MIN_SLOTS + 1);
    DEMO_SLOTS[..count as usize].to_vec()
}

pub fn create_demo_booking(
    random: &dyn RandomSource,
    user_id: &str,
    service: &str,
    date: &str,
    time: &str,
) -> DemoBooking {
    DemoBooking {
        booking_id: format!("BK{}", 1000 + random.below(9000)),
        user_id: user_id.to_string(),
        service: service.to_string(),
        date: date.to_string(),
        time: time.to_string(),
        status: "confirmed",
        created_at: Utc::now(),
    }
}
