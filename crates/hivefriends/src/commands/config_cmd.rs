//! Config subcommand handlers.

use dialoguer::{Input, Select};

use hivefriends_core::Environment;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::{CliError, prompt_err};
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),

        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(
                global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|_| format!("{c:#?}")),
                |c| c.default_profile_name().to_owned(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }
    }
}

// ── Init: interactive wizard ────────────────────────────────────────

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("hivefriends configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    // 1. Profile name
    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default(global.profile.clone().unwrap_or_else(|| "default".into()))
        .interact_text()
        .map_err(prompt_err)?;

    // 2. Environment
    let environments = [Environment::Production, Environment::Development];
    let env_selection = Select::new()
        .with_prompt("Environment")
        .items(&environments)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    let environment = environments
        .get(env_selection)
        .copied()
        .unwrap_or_default();

    // 3. API URL
    let api_url: String = Input::new()
        .with_prompt("API URL")
        .default(environment.default_url().to_owned())
        .validate_with(|input: &String| -> Result<(), String> {
            url::Url::parse(input)
                .map(|_| ())
                .map_err(|e| format!("invalid URL: {e}"))
        })
        .interact_text()
        .map_err(prompt_err)?;

    // 4. Username
    let username: String = Input::new()
        .with_prompt("Username (leave empty to enter at login)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;

    // 5. Password storage
    let mut password = None;
    if !username.is_empty() {
        let store_choices = &[
            "Enter at every login",
            "Store in system keyring (recommended)",
            "Save to config file (plaintext)",
        ];
        let store_selection = Select::new()
            .with_prompt("Where to keep the password?")
            .items(store_choices)
            .default(0)
            .interact()
            .map_err(prompt_err)?;

        if store_selection > 0 {
            let pass = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
            if pass.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }
            if store_selection == 1 {
                hivefriends_config::store_password(&profile_name, &pass)?;
                eprintln!("   Password stored in system keyring");
            } else {
                password = Some(pass);
            }
        }
    }

    // 6. Merge into the existing config
    let mut cfg: Config = config::load_config_or_default();
    let profile = Profile {
        api_url: (api_url != environment.default_url()).then_some(api_url),
        environment: Some(environment.to_string()),
        username: (!username.is_empty()).then_some(username),
        password,
        ..Profile::default()
    };
    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());

    let path = config::save_config(&cfg)?;

    output::success(global, &format!("Configuration written to {}", path.display()));
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Next: hivefriends login");
    Ok(())
}
