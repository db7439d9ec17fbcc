//! Schema command implementation

use anyhow::{Result, bail};
use xam_kernel::KernelState;

pub fn run(state: &KernelState) -> Result<()> {
    let address = state.xam_get_online_schema();
    if address == 0 {
        bail!("XamGetOnlineSchema returned a null block");
    }
    let memory = state.memory();
    let schema_ptr = memory.load_u32(address)?;
    let size = memory.load_u32(address + 4)?;
    let bytes = memory.read_bytes(schema_ptr, size as usize)?;

    println!("block:  {address:#010X}");
    println!("schema: {schema_ptr:#010X} ({size} bytes)");
    for (i, row) in bytes.chunks(16).enumerate() {
        let hex = row
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ");
        println!("  {:04X}: {hex}", i * 16);
    }
    Ok(())
}
