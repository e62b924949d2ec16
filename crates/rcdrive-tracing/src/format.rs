//! Line format: `[YYYY-MM-DD HH:MM:SS] [LEVEL] [tag] message`

use std::fmt;

use chrono::{Local, NaiveDateTime};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render one log line, without the trailing newline.
pub fn format_line(at: NaiveDateTime, level: &Level, tag: &str, message: &str) -> String {
    format!(
        "[{}] [{}] [{}] {}",
        at.format(TIMESTAMP_FORMAT),
        level,
        tag,
        message
    )
}

/// Event formatter producing [`format_line`] output stamped with local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut message = String::new();
        ctx.format_fields(format::Writer::new(&mut message), event)?;

        let meta = event.metadata();
        let line = format_line(
            Local::now().naive_local(),
            meta.level(),
            meta.target(),
            &message,
        );
        writeln!(writer, "{line}")
    }
}
