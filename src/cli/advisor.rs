use colored::Colorize;

use crate::error::Result;
use crate::settings::load_settings;

pub fn run(call: bool) -> Result<()> {
    let advisor = load_settings().advisor;
    println!("{}", advisor.name.bold());
    println!("{}", advisor.role);
    println!("{}", advisor.phone);

    if call {
        advisor.call()?;
        println!("Llamando a {}...", advisor.name);
    }
    Ok(())
}
