//! Activity feed handler.

use hivefriends_core::{ActivityItem, App, DayGroup, FeedEntry};

use crate::cli::{ActivityArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(app: &App, args: ActivityArgs, global: &GlobalOpts) -> Result<(), CliError> {
    util::require_session(app)?;

    let progress = output::spinner(global, "Loading activity...");
    let (days, ()) = tokio::join!(app.fetch_activity(), util::load_users(app));
    progress.finish_and_clear();
    let days = days?;

    let shown = &days[..args.days.map_or(days.len(), |n| n.min(days.len()))];
    let color = output::should_color(global.color);

    let out = output::render_single(
        global.output,
        shown,
        |days| render_days(app, days, color),
        |days| {
            days.iter()
                .map(|d| d.day.clone())
                .collect::<Vec<_>>()
                .join("\n")
        },
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

fn render_days(app: &App, days: &[DayGroup], color: bool) -> String {
    if days.is_empty() {
        return "No activity yet".into();
    }
    let mut lines = Vec::new();
    for day in days {
        lines.push(day.day.clone());
        for entry in &day.entries {
            lines.push(format!("  {}", describe(app, entry, color)));
        }
    }
    lines.join("\n")
}

fn describe(app: &App, entry: &FeedEntry, color: bool) -> String {
    match entry {
        FeedEntry::Images { uploader, images } => {
            let noun = if images.len() == 1 { "image" } else { "images" };
            format!(
                "{} uploaded {} {noun}",
                util::label(app, uploader),
                images.len()
            )
        }
        FeedEntry::Item(ActivityItem::Comment(c)) => format!(
            "{} commented on {}: {}",
            util::label(app, &c.author),
            output::dim(&c.image_key, color),
            super::comments::highlight(app, &c.text, color)
        ),
        FeedEntry::Item(ActivityItem::Album(a)) => format!(
            "{} published \"{}\"",
            util::label(app, &a.author),
            a.title
        ),
        FeedEntry::Item(ActivityItem::User(u)) => format!("{} joined", u.display_name()),
        FeedEntry::Item(ActivityItem::Image(i)) => format!(
            "{} uploaded {}",
            util::label(app, &i.image.uploader),
            output::dim(&i.image.key, color)
        ),
    }
}
