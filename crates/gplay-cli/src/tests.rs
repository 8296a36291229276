use super::*;

#[test]
fn parses_app_command() {
    let cli = Cli::try_parse_from(["gplay-cli", "app", "com.example.app"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::App {
            ref app_id,
            lang: None,
            country: None,
        } if app_id == "com.example.app"
    ));
}

#[test]
fn parses_app_command_with_locale() {
    let cli = Cli::try_parse_from([
        "gplay-cli",
        "app",
        "com.example.app",
        "--lang",
        "ja",
        "--country",
        "jp",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Commands::App { lang: Some(ref l), country: Some(ref c), .. } if l == "ja" && c == "jp"
    ));
}

#[test]
fn reviews_defaults_to_newest_first_page() {
    let cli = Cli::try_parse_from(["gplay-cli", "reviews", "com.example.app"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Reviews {
            sort: Sort::Newest,
            page: 0,
            lang: None,
            ..
        }
    ));
}

#[test]
fn reviews_parses_sort_and_page() {
    let cli = Cli::try_parse_from([
        "gplay-cli",
        "reviews",
        "com.example.app",
        "--sort",
        "helpfulness",
        "--page",
        "3",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Reviews {
            sort: Sort::Helpfulness,
            page: 3,
            ..
        }
    ));
}

#[test]
fn reviews_rejects_unknown_sort() {
    let result = Cli::try_parse_from([
        "gplay-cli",
        "reviews",
        "com.example.app",
        "--sort",
        "oldest",
    ]);
    assert!(result.is_err());
}

#[test]
fn search_defaults() {
    let cli = Cli::try_parse_from(["gplay-cli", "search", "pixel art"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Search {
            ref term,
            num: 20,
            price: PriceFilter::All,
            ..
        } if term == "pixel art"
    ));
}

#[test]
fn search_parses_num_and_price() {
    let cli = Cli::try_parse_from([
        "gplay-cli", "search", "maps", "--num", "120", "--price", "paid",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Search {
            num: 120,
            price: PriceFilter::Paid,
            ..
        }
    ));
}

#[test]
fn missing_subcommand_is_error() {
    assert!(Cli::try_parse_from(["gplay-cli"]).is_err());
}
