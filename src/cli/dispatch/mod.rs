use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::Result;
use secrecy::SecretString;

pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let signing_secret = matches
        .get_one::<String>("secret")
        .map(|s| SecretString::from(s.to_string()))
        .ok_or_else(|| anyhow::anyhow!("missing required argument: --secret"))?;

    let globals = GlobalArgs::new(signing_secret);

    let action = Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        session_ttl: matches
            .get_one::<u64>("session-ttl")
            .copied()
            .unwrap_or(86_400),
    };

    Ok((action, globals))
}
