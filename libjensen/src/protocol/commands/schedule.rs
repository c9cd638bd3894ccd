// libjensen/src/protocol/commands/schedule.rs

//! Meeting schedule records.

use crate::constants::MAX_SCHEDULE_RECORDS;
use crate::protocol::parser;
use crate::types::MeetingSchedule;
use crate::{Error, Result};

/// Length of one encoded schedule record
pub const SCHEDULE_RECORD_LEN: usize = 34;
const SHORTCUT_LEN: usize = 18;

/// Encode SendMeetingScheduleInfo body (command 20)
/// Record layout: start BCD(7) + end BCD(7) + platform(1) + reserved(1) + shortcut(18)
pub fn encode_meeting_schedule(schedules: &[MeetingSchedule]) -> Result<Vec<u8>> {
    if schedules.len() > MAX_SCHEDULE_RECORDS {
        return Err(Error::InvalidArgument(format!(
            "{} schedules exceed the device limit of {}",
            schedules.len(),
            MAX_SCHEDULE_RECORDS
        )));
    }

    let mut buf = Vec::with_capacity(schedules.len() * SCHEDULE_RECORD_LEN);
    for s in schedules {
        if s.end < s.start {
            return Err(Error::InvalidArgument("schedule ends before it starts".into()));
        }
        if s.shortcut.len() > SHORTCUT_LEN {
            return Err(Error::InvalidArgument(format!(
                "shortcut of {} bytes exceeds {}",
                s.shortcut.len(),
                SHORTCUT_LEN
            )));
        }
        buf.extend(parser::to_bcd(&s.start.format("%Y%m%d%H%M%S").to_string())?);
        buf.extend(parser::to_bcd(&s.end.format("%Y%m%d%H%M%S").to_string())?);
        buf.push(s.platform);
        buf.push(0);
        buf.extend_from_slice(&s.shortcut);
        buf.resize(buf.len() + SHORTCUT_LEN - s.shortcut.len(), 0);
    }
    Ok(buf)
}
