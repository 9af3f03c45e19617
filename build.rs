use std::{env, error::Error, fs, path::Path};

use serde::Deserialize;

/// Build-time node provisioning, read from `node.toml` when present.
#[derive(Deserialize)]
struct RawNodeToml {
    dev_addr: String,
    nwk_skey: String,
    app_skey: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-env-changed=GASNODE_CONFIG");

    let path = env::var("GASNODE_CONFIG").unwrap_or_else(|_| "node.toml".to_string());
    println!("cargo:rerun-if-changed={path}");
    let code = match fs::read_to_string(&path) {
        Ok(toml_str) => {
            let raw: RawNodeToml = toml::from_str(&toml_str)?;
            format!(
                r#"
        pub const BUILD_CREDENTIALS: Option<RawCredentials> = Some(RawCredentials {{
            dev_addr: {addr:?},
            nwk_skey: {nwk:?},
            app_skey: {app:?},
        }});
    "#,
                addr = raw.dev_addr,
                nwk = raw.nwk_skey,
                app = raw.app_skey,
            )
        }
        Err(_) => {
            println!("cargo:warning={path} not found, building without LoRaWAN credentials");
            "pub const BUILD_CREDENTIALS: Option<RawCredentials> = None;".to_string()
        }
    };

    let out_dir = env::var("OUT_DIR")?;
    fs::write(Path::new(&out_dir).join("credentials.rs"), code)?;

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();

    Ok(())
}
