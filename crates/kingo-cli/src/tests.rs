use super::*;

use kingo_core::{CatalogItem, SessionStore};

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["kingo-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
    assert!(!cli.json);
}

#[test]
fn parses_search_with_global_json_flag() {
    let cli = Cli::try_parse_from(["kingo-cli", "search", "tesla model", "--json"])
        .expect("expected valid cli args");
    assert!(cli.json);
    assert!(matches!(
        cli.command,
        Some(Commands::Search { ref query }) if query == "tesla model"
    ));
}

#[test]
fn parses_available_dates() {
    let cli = Cli::try_parse_from([
        "kingo-cli",
        "available",
        "--from",
        "2026-05-01",
        "--to",
        "2026-05-03",
    ])
    .expect("expected valid cli args");
    let Some(Commands::Available { from, to }) = cli.command else {
        panic!("expected available command");
    };
    assert_eq!(from.to_string(), "2026-05-01");
    assert_eq!(to.to_string(), "2026-05-03");
}

#[test]
fn available_rejects_malformed_date() {
    let result = Cli::try_parse_from(["kingo-cli", "available", "--from", "05/01", "--to", "x"]);
    assert!(result.is_err());
}

#[test]
fn parses_booking_url_options() {
    let cli = Cli::try_parse_from([
        "kingo-cli",
        "booking-url",
        "1010",
        "--name",
        "Tesla Model Y",
        "--start",
        "2026-06-01",
    ])
    .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::BookingUrl {
            ref vendor_product_id,
            slug: None,
            name: Some(_),
            start: Some(_),
            end: None,
        }) if vendor_product_id == "1010"
    ));
}

#[test]
fn parses_session_login() {
    let cli = Cli::try_parse_from(["kingo-cli", "session", "login", "Dana"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Session {
            command: SessionCommands::Login { ref display_name }
        }) if display_name == "Dana"
    ));
}

#[test]
fn item_line_includes_category_and_slug() {
    let item = CatalogItem {
        id: "1010".to_string(),
        display_name: "Tesla Model Y".to_string(),
        image_url: None,
        vendor_product_id: Some("1010".to_string()),
        slug: Some("tesla-y".to_string()),
        category: Some("SUV".to_string()),
        brand: None,
        model: None,
        price: None,
    };
    let line = catalog::item_line(&item);
    assert!(line.starts_with("1010"));
    assert!(line.ends_with("Tesla Model Y [SUV] (tesla-y)"));
}

#[test]
fn session_commands_update_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SessionStore::new(dir.path().join("session.json"));

    session::run_session(
        &store,
        SessionCommands::Login {
            display_name: "Dana".to_string(),
        },
        false,
    )
    .expect("login");
    let state = store.state().expect("state");
    assert!(state.logged_in);
    assert_eq!(session::describe(&state), "logged in as Dana");

    session::run_session(
        &store,
        SessionCommands::Refresh {
            path: "/search".to_string(),
        },
        false,
    )
    .expect("refresh");
    assert!(!store.mark_refreshed("/search").expect("mark"));
    session::run_session(&store, SessionCommands::Logout, true).expect("logout");
    let state = store.state().expect("state");
    assert!(!state.logged_in);
    assert_eq!(session::describe(&state), "logged out; refreshed: /search");
}

#[test]
fn booking_url_rejects_reversed_dates() {
    let shop = kingo_sharefox::ShopConfig::new("kingorides");
    let client = kingo_sharefox::SharefoxClient::new(shop, None, "kingo-test/0.1").expect("client");
    let mut request = kingo_sharefox::BookingRequest::new("1010");
    request.start = chrono::NaiveDate::from_ymd_opt(2026, 6, 3);
    request.end = chrono::NaiveDate::from_ymd_opt(2026, 6, 1);
    assert!(catalog::run_booking_url(&client, &request, false).is_err());
}

#[test]
fn parses_session_refresh() {
    let cli = Cli::try_parse_from(["kingo-cli", "session", "refresh", "/search"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Session {
            command: SessionCommands::Refresh { ref path }
        }) if path == "/search"
    ));
}

#[test]
fn refresh_reports_reload_only_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SessionStore::new(dir.path().join("session.json"));
    let first = store.mark_refreshed("/").expect("mark");
    let second = store.mark_refreshed("/").expect("mark");
    assert_eq!(session::refresh_line("/", first), "/: reload now");
    assert_eq!(session::refresh_line("/", second), "/: already refreshed");
}
