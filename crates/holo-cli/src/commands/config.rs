//! Config synthesis command

use super::load_form;
use anyhow::Result;
use holo_pack::synthesize;

pub fn run(form_path: Option<&str>) -> Result<()> {
    let form = load_form(form_path)?;
    let config = synthesize(&form, &[]);
    println!("{}", config.to_json_pretty()?);
    Ok(())
}
