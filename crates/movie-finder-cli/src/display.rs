use std::io::{stdout, Write};

pub trait Displayable {
    fn display_to(&self, out: &mut dyn Write) -> std::io::Result<()>;

    fn display(&self) {
        if let Err(e) = self.display_to(&mut stdout().lock()) {
            log::error!("Could not write the output: {e}");
        }
    }
}

impl<T: serde::Serialize> Displayable for T {
    fn display_to(&self, out: &mut dyn Write) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, self)?;
        writeln!(out)
    }
}
