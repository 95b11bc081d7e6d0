use core::fmt;

// Unifies `core::fmt::Write` and `std::io::Write`.
//
// Reporters have nowhere to send a failed write, so sinks panic on error
// rather than threading `Result`s through every reporter callback.
pub trait Output {
    fn output_str(&mut self, s: &str);
    fn output_char(&mut self, c: char) {
        self.output_str(c.encode_utf8(&mut [0; 4]))
    }
    fn output_fmt(&mut self, args: fmt::Arguments<'_>);
    fn flush(&mut self) {}
}

pub struct Void;
impl Output for Void {
    fn output_str(&mut self, _s: &str) {}
    fn output_fmt(&mut self, _args: fmt::Arguments<'_>) {}
}

impl Output for dyn fmt::Write + '_ {
    #[inline(always)]
    fn output_str(&mut self, s: &str) {
        self.write_str(s).expect("formatter sink failed");
    }

    #[inline(always)]
    fn output_char(&mut self, c: char) {
        self.write_char(c).expect("formatter sink failed")
    }

    fn output_fmt(&mut self, args: fmt::Arguments<'_>) {
        self.write_fmt(args).expect("formatter sink failed")
    }
}

impl Output for dyn std::io::Write + '_ {
    fn output_str(&mut self, s: &str) {
        self.write_all(s.as_bytes()).expect("output stream failed");
    }

    fn output_fmt(&mut self, args: fmt::Arguments<'_>) {
        std::io::Write::write_fmt(self, args).expect("output stream failed")
    }

    fn flush(&mut self) {
        std::io::Write::flush(self).expect("output stream failed")
    }
}

/// Lets reporters use `write!` on any [`Output`].
pub struct OutputAdapter<'o, O: Output + ?Sized>(pub &'o mut O);

impl<O: Output + ?Sized> fmt::Write for OutputAdapter<'_, O> {
    #[inline(always)]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.output_str(s);
        Ok(())
    }

    #[inline(always)]
    fn write_char(&mut self, c: char) -> fmt::Result {
        self.0.output_char(c);
        Ok(())
    }

    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        self.0.output_fmt(args);
        Ok(())
    }
}

impl<O: Output + ?Sized> OutputAdapter<'_, O> {
    pub fn flush(&mut self) {
        self.0.flush()
    }
}
