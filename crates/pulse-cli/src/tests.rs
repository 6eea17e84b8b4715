use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["pulse-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_db_migrate_command() {
    let cli = Cli::try_parse_from(["pulse-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn parses_ingest_with_day_override() {
    let user = "0b7a4e53-2c1f-4f6e-9d55-0a4e1c9b2f10";
    let cli = Cli::try_parse_from(["pulse-cli", "ingest", "--user", user, "--day", "3"])
        .expect("expected valid cli args");

    match cli.command {
        Some(Commands::Ingest { user: parsed, day }) => {
            assert_eq!(parsed.to_string(), user);
            assert_eq!(day, Some(3));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn rejects_out_of_range_day() {
    let user = "0b7a4e53-2c1f-4f6e-9d55-0a4e1c9b2f10";
    assert!(Cli::try_parse_from(["pulse-cli", "ingest", "--user", user, "--day", "7"]).is_err());
}

#[test]
fn rejects_malformed_user() {
    assert!(Cli::try_parse_from(["pulse-cli", "ingest", "--user", "alice"]).is_err());
}

#[test]
fn parses_repeated_insight_flags() {
    let user = "0b7a4e53-2c1f-4f6e-9d55-0a4e1c9b2f10";
    let a = Uuid::new_v4().to_string();
    let b = Uuid::new_v4().to_string();
    let cli = Cli::try_parse_from([
        "pulse-cli",
        "generate",
        "--user",
        user,
        "--insight",
        &a,
        "--insight",
        &b,
    ])
    .expect("expected valid cli args");

    match cli.command {
        Some(Commands::Generate { insights, day, .. }) => {
            assert_eq!(insights.len(), 2);
            assert_eq!(day, None);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn generate_requires_an_insight() {
    let user = "0b7a4e53-2c1f-4f6e-9d55-0a4e1c9b2f10";
    assert!(Cli::try_parse_from(["pulse-cli", "generate", "--user", user]).is_err());
}

#[test]
fn parses_publish_command() {
    let user = "0b7a4e53-2c1f-4f6e-9d55-0a4e1c9b2f10";
    let draft = Uuid::new_v4();
    let cli = Cli::try_parse_from([
        "pulse-cli",
        "publish",
        "--user",
        user,
        "--draft",
        &draft.to_string(),
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Publish { draft: d, .. }) if d == draft
    ));
}
