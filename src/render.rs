//! Plain-data views of the watch-list and meeting list.

use crate::config::DISCORD_EMBED_LIMIT;
use crate::services::meetings::ScheduledMeeting;
use crate::store::MovieEntry;

pub const WATCHED_GLYPH: &str = "✅";
pub const UNWATCHED_GLYPH: &str = "🟥";
pub const MOVIES_TITLE: &str = "🍿  Movies  🍿";
pub const MEETINGS_TITLE: &str = "🎬  Meetings  🎬";
pub const EMPTY_MOVIES: &str = "📂 The list is empty.";
pub const EMPTY_MEETINGS: &str = "📭 No meetings scheduled.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub title: String,
    pub lines: Vec<String>,
    pub footer: Option<String>,
}

impl ListView {
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Lines joined for an embed body, cut at the last whole line that fits.
    pub fn description(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            let extra = if out.is_empty() { 0 } else { 1 };
            if out.chars().count() + extra + line.chars().count() > DISCORD_EMBED_LIMIT {
                out.push_str("\n…");
                break;
            }
            if extra == 1 {
                out.push('\n');
            }
            out.push_str(line);
        }
        out
    }
}

pub fn status_glyph(watched: bool) -> &'static str {
    if watched {
        WATCHED_GLYPH
    } else {
        UNWATCHED_GLYPH
    }
}

pub fn movie_line(position: usize, entry: &MovieEntry) -> String {
    format!(
        "{:02}. {} {} - <@{}>",
        position,
        status_glyph(entry.watched),
        entry.title,
        entry.proposer_id
    )
}

pub fn render_movies(movies: &[MovieEntry]) -> ListView {
    let lines = if movies.is_empty() {
        vec![EMPTY_MOVIES.to_string()]
    } else {
        movies
            .iter()
            .enumerate()
            .map(|(i, entry)| movie_line(i + 1, entry))
            .collect()
    };

    ListView {
        title: MOVIES_TITLE.to_string(),
        lines,
        footer: None,
    }
}

pub fn render_meetings(meetings: &[ScheduledMeeting]) -> ListView {
    let lines = if meetings.is_empty() {
        vec![EMPTY_MEETINGS.to_string()]
    } else {
        meetings
            .iter()
            .enumerate()
            .map(|(i, m)| {
                format!(
                    "{:02}. {} - {} <#{}>",
                    i + 1,
                    m.record.film_title,
                    m.record.due_at(),
                    m.record.channel_id
                )
            })
            .collect()
    };

    ListView {
        title: MEETINGS_TITLE.to_string(),
        lines,
        footer: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::MessageHandle;
    use crate::store::MeetingRecord;

    #[test]
    fn test_watch_list_scenario() {
        let mut movies = vec![MovieEntry::new("Inception", 42)];
        assert_eq!(render_movies(&movies).lines, vec!["01. 🟥 Inception - <@42>"]);

        movies[0].watched = true;
        assert_eq!(render_movies(&movies).lines, vec!["01. ✅ Inception - <@42>"]);

        movies.remove(0);
        let view = render_movies(&movies);
        assert_eq!(view.lines, vec![EMPTY_MOVIES]);
        assert_eq!(view.title, MOVIES_TITLE);
    }

    #[test]
    fn test_render_is_ordered_and_pure() {
        let movies = vec![
            MovieEntry::new("Heat", 1),
            MovieEntry::new("Alien", 2),
            MovieEntry::new("Up", 3),
        ];
        let first = render_movies(&movies);
        assert_eq!(first, render_movies(&movies));
        assert_eq!(first.lines[1], "02. 🟥 Alien - <@2>");
        assert_eq!(first.description().lines().count(), 3);
        assert_eq!(first.footer, None);
    }

    #[test]
    fn test_description_respects_embed_limit() {
        let movies: Vec<_> = (0..200)
            .map(|i| MovieEntry::new(format!("A fairly long film title number {}", i), 1))
            .collect();
        let text = render_movies(&movies).description();
        assert!(text.chars().count() <= DISCORD_EMBED_LIMIT + 2);
        assert!(text.ends_with('…'));
        assert!(text.starts_with("01. "));
    }

    #[test]
    fn test_render_meetings() {
        assert_eq!(render_meetings(&[]).lines, vec![EMPTY_MEETINGS]);

        let meeting = ScheduledMeeting {
            guild_id: 1,
            announcement: MessageHandle::new(7, 99),
            record: MeetingRecord {
                film_title: "Dune".to_string(),
                date: "01/01/2030".to_string(),
                time: "20:00".to_string(),
                channel_id: 7,
            },
        };
        let view = render_meetings(&[meeting]).with_footer("footer");
        assert_eq!(view.lines, vec!["01. Dune - 01/01/2030 20:00 <#7>"]);
        assert_eq!(view.footer.as_deref(), Some("footer"));
    }
}
