//! Timed viewing sessions with reaction RSVPs.
//!
//! A meeting is `Scheduled` while its record is in the store and ends either
//! `Fired` (the due tick matched it) or `Cancelled` (removed by command).
//! Both terminal states delete the record.
//!
//! Matching is exact string equality between `"{date} {time}"` and the
//! formatted wall clock at minute resolution. A tick that does not land on
//! the target minute never fires that meeting.

use crate::error::{CommandError, CommandResult, StoreError};
use crate::messaging::{MessageHandle, Messenger, Outgoing};
use crate::services::to_index;
use crate::store::{MeetingRecord, Store};
use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const AFFIRMATIVE: &str = "👍";
pub const NEGATIVE: &str = "👎";

/// Wall-clock format compared against `"{date} {time}"`.
pub const WALL_CLOCK_FORMAT: &str = "%d/%m/%Y %H:%M";

const DATE_SHAPE: &str = "99/99/9999";
const TIME_SHAPE: &str = "99:99";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledMeeting {
    pub guild_id: u64,
    pub announcement: MessageHandle,
    pub record: MeetingRecord,
}

#[derive(Clone)]
pub struct MeetingScheduler {
    store: Arc<Store>,
    messenger: Arc<dyn Messenger>,
}

impl MeetingScheduler {
    pub fn new(store: Arc<Store>, messenger: Arc<dyn Messenger>) -> Self {
        Self { store, messenger }
    }

    /// Posts the announcement, adds the RSVP reactions and stores the meeting.
    ///
    /// Only the shape of `date`/`time` is checked; `31/02/2099` is accepted.
    pub async fn schedule(
        &self,
        guild_id: u64,
        film_title: &str,
        date: &str,
        time: &str,
        channel_id: u64,
    ) -> CommandResult<ScheduledMeeting> {
        if !matches_shape(date, DATE_SHAPE) {
            return Err(CommandError::InvalidDate(date.to_string()));
        }
        if !matches_shape(time, TIME_SHAPE) {
            return Err(CommandError::InvalidTime(time.to_string()));
        }

        let announcement = self
            .messenger
            .send_message(
                channel_id,
                Outgoing::text(announcement_text(film_title, date, time)),
            )
            .await
            .map_err(CommandError::Messaging)?;

        let record = MeetingRecord {
            film_title: film_title.to_string(),
            date: date.to_string(),
            time: time.to_string(),
            channel_id,
        };
        if let Err(e) = self
            .attach_and_store(guild_id, announcement, record.clone())
            .await
        {
            // no record means nobody should be able to RSVP
            if let Err(cleanup) = self.messenger.delete_message(announcement).await {
                warn!(
                    "Could not delete orphaned announcement {}: {}",
                    announcement.message_id, cleanup
                );
            }
            return Err(e);
        }

        info!(
            "Guild {}: scheduled '{}' for {} (announcement {})",
            guild_id,
            record.film_title,
            record.due_at(),
            announcement.message_id
        );
        Ok(ScheduledMeeting {
            guild_id,
            announcement,
            record,
        })
    }

    async fn attach_and_store(
        &self,
        guild_id: u64,
        announcement: MessageHandle,
        record: MeetingRecord,
    ) -> CommandResult<()> {
        for symbol in [AFFIRMATIVE, NEGATIVE] {
            self.messenger
                .add_reaction(announcement, symbol)
                .await
                .map_err(CommandError::Messaging)?;
        }
        self.store
            .meetings
            .mutate(|book| {
                book.entry(guild_id)
                    .or_default()
                    .insert(announcement.message_id, record);
                Ok::<_, CommandError>(())
            })
            .await
    }

    /// Scheduled meetings of a server in creation order.
    pub async fn list(&self, guild_id: u64) -> Vec<ScheduledMeeting> {
        self.store
            .meetings
            .read(|book| {
                book.get(&guild_id)
                    .map(|meetings| {
                        meetings
                            .iter()
                            .map(|(message_id, record)| ScheduledMeeting {
                                guild_id,
                                announcement: MessageHandle::new(record.channel_id, *message_id),
                                record: record.clone(),
                            })
                            .collect()
                    })
                    .unwrap_or_default()
            })
            .await
    }

    /// Cancels the meeting at a 1-based position of [`Self::list`].
    pub async fn remove(&self, guild_id: u64, position: i64) -> CommandResult<ScheduledMeeting> {
        let (message_id, record) = self
            .store
            .meetings
            .mutate(|book| {
                let meetings = book.entry(guild_id).or_default();
                let len = meetings.len();
                let idx = to_index(position, len)?;
                let out_of_range = || CommandError::IndexOutOfRange {
                    index: position,
                    len,
                };
                let message_id = meetings.keys().nth(idx).copied().ok_or_else(out_of_range)?;
                let record = meetings.remove(&message_id).ok_or_else(out_of_range)?;
                Ok::<_, CommandError>((message_id, record))
            })
            .await?;

        info!(
            "Guild {}: cancelled '{}' at {}",
            guild_id,
            record.film_title,
            record.due_at()
        );
        Ok(ScheduledMeeting {
            guild_id,
            announcement: MessageHandle::new(record.channel_id, message_id),
            record,
        })
    }

    /// Fires every meeting whose date and time equal `now`. Returns how many
    /// notifications went out.
    ///
    /// The record is deleted and the deletion persisted before the
    /// notification is sent, so a crash in between loses the notification
    /// rather than sending it twice.
    pub async fn check_due(&self, now: NaiveDateTime) -> usize {
        let now = now.format(WALL_CLOCK_FORMAT).to_string();
        let due_key = now.as_str();
        let due: Vec<(u64, u64)> = self
            .store
            .meetings
            .read(|book| {
                book.iter()
                    .flat_map(|(guild_id, meetings)| {
                        meetings
                            .iter()
                            .filter(move |(_, record)| record.due_at() == due_key)
                            .map(move |(message_id, _)| (*guild_id, *message_id))
                    })
                    .collect()
            })
            .await;

        if due.is_empty() {
            return 0;
        }
        debug!("{} meeting(s) due at {}", due.len(), now);

        let mut fired = 0;
        for (guild_id, message_id) in due {
            let taken = self
                .store
                .meetings
                .mutate(|book| {
                    Ok::<_, StoreError>(
                        book.get_mut(&guild_id)
                            .and_then(|meetings| meetings.remove(&message_id)),
                    )
                })
                .await;

            let record = match taken {
                Ok(Some(record)) => record,
                Ok(None) => {
                    debug!("Meeting {} was cancelled before firing", message_id);
                    continue;
                }
                Err(e) => {
                    error!("Could not retire meeting {}, not firing: {}", message_id, e);
                    continue;
                }
            };

            match self.notify(message_id, &record).await {
                Ok(()) => {
                    fired += 1;
                    info!(
                        "Guild {}: fired meeting '{}' ({})",
                        guild_id, record.film_title, now
                    );
                }
                Err(e) => error!(
                    "Failed to send notification for meeting {}: {}",
                    message_id, e
                ),
            }
        }
        fired
    }

    async fn notify(&self, message_id: u64, record: &MeetingRecord) -> anyhow::Result<()> {
        let announcement = MessageHandle::new(record.channel_id, message_id);
        let participants = match self
            .messenger
            .fetch_reactors(announcement, AFFIRMATIVE)
            .await
        {
            Ok(reactors) => {
                let mut ids: Vec<u64> = reactors
                    .into_iter()
                    .filter(|r| !r.bot)
                    .map(|r| r.user_id)
                    .collect();
                ids.sort_unstable();
                ids.dedup();
                ids
            }
            Err(e) => {
                warn!(
                    "Could not read RSVPs for meeting {}, notifying without tags: {}",
                    message_id, e
                );
                Vec::new()
            }
        };

        self.messenger
            .send_message(
                record.channel_id,
                Outgoing::text_mentioning(
                    notification_text(&record.film_title, &participants),
                    &participants,
                ),
            )
            .await?;
        Ok(())
    }
}

pub fn announcement_text(film_title: &str, date: &str, time: &str) -> String {
    format!(
        "🎬 Session **{}** at **{}** on **{}**\nWho's coming?",
        film_title, time, date
    )
}

pub fn notification_text(film_title: &str, participants: &[u64]) -> String {
    let tags = participants
        .iter()
        .map(|id| format!("<@{}>", id))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "🎬 It's time for **{}**! 🎬\nParticipants: {}",
        film_title, tags
    )
}

/// `9` in `shape` stands for an ASCII digit, anything else must match exactly.
fn matches_shape(value: &str, shape: &str) -> bool {
    value.len() == shape.len()
        && value.bytes().zip(shape.bytes()).all(|(v, s)| match s {
            b'9' => v.is_ascii_digit(),
            _ => v == s,
        })
}
