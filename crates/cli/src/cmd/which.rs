use anyhow::Result;

use binshim_lib::config::Config;
use binshim_lib::fs::OsFileSystem;
use binshim_lib::resolve::Resolver;

use crate::output;

pub fn cmd_which(config: &Config) -> Result<i32> {
  match Resolver::new(config, &OsFileSystem).resolve() {
    Ok(resolved) => {
      println!("{}", resolved.path.display());
      Ok(0)
    }
    Err(e) => {
      output::failure(&e.to_string());
      Ok(1)
    }
  }
}
