//! `open`: run an app path through the route guard.

use serde::Serialize;

use hivefriends_core::{App, Breadcrumb, Route};

use crate::cli::{GlobalOpts, OpenArgs};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct Opened {
    requested: String,
    route: Route,
    breadcrumb: Breadcrumb,
    session: String,
}

pub async fn handle(app: &App, args: OpenArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let route = app.navigate(&args.path).await?;
    let opened = Opened {
        requested: args.path,
        breadcrumb: app.navigator().breadcrumb(),
        session: app.session().state().to_string(),
        route,
    };

    let color = output::should_color(global.color);
    let out = output::render_single(
        global.output,
        &opened,
        |o| {
            let name = output::dim(&format!("({})", o.route.name), color);
            let mut lines = vec![format!("{} {name}", o.route.path)];
            if !o.breadcrumb.label.is_empty() {
                lines.push(format!("Breadcrumb: {}", o.breadcrumb.label));
            }
            if o.route.path != o.requested {
                lines.push(output::dim(&format!("redirected from {}", o.requested), color));
            }
            lines.push(format!("Session:    {}", o.session));
            lines.join("\n")
        },
        |o| o.route.path.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
