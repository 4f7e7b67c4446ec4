use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("{} {}", crate::PKG_NAME, crate::VERSION);
    println!("{}", crate::PKG_DESCRIPTION);
    Ok(())
}
