use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Be explicit about which envars to print. IKZ_JWT_SECRET and IKZ_MP_ACCESS_TOKEN must never appear here.
    const DISPLAY_ENVS: [&str; 14] = [
        "RUST_LOG",
        "IKZ_HOST",
        "IKZ_PORT",
        "IKZ_DATABASE_URL",
        "IKZ_JWT_ISSUER",
        "IKZ_USE_X_FORWARDED_FOR",
        "IKZ_USE_FORWARDED",
        "IKZ_MP_API_URL",
        "IKZ_MP_SUCCESS_URL",
        "IKZ_MP_FAILURE_URL",
        "IKZ_MP_PENDING_URL",
        "IKZ_MP_CURRENCY",
        "IKZ_MP_TIMEOUT_SECS",
        "IKZ_SKIP_MIGRATIONS",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
