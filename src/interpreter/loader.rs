//! Program frame loader
//!
//! A frame is one chunk uploaded by the host. Its first byte selects
//! between immediate evaluation (the rest is a bytecode expression, run on
//! the spot) and a program image that extends the registries, installs or
//! patches node and function bodies, replaces the update program and
//! optionally runs an initialization expression.
//!
//! Loading is incremental by design: body blocks carry their target index,
//! so the host compiler can patch a live program by re-sending only the
//! bodies that changed. A frame that fails mid-way with `OutOfMemory`
//! leaves the machine consistent; bodies already installed by that frame
//! stay installed.

use super::Interpreter;
use crate::error::{result_code, VmError};
use crate::transport::Transport;

use tracing::debug;

/// Little-endian cursor over one frame payload. The uploader is trusted;
/// a malformed length here is a host-side bug, not device input to survive.
struct FrameReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FrameReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn read_u8(&mut self) -> u8 {
        let b = self.buf[self.pos];
        self.pos += 1;

        b
    }

    fn read_u16(&mut self) -> u16 {
        let v = u16::from_le_bytes([self.buf[self.pos], self.buf[self.pos + 1]]);
        self.pos += 2;

        v
    }

    fn read_bytes(&mut self, len: usize) -> &'a [u8] {
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;

        bytes
    }

    fn rest(self) -> &'a [u8] {
        &self.buf[self.pos..]
    }
}

impl<T> Interpreter<T>
where
    T: Transport,
{
    /// Process one uploaded frame and acknowledge it with a status byte on
    /// the transport.
    pub fn new_bytecode(&mut self, frame: &[u8]) -> Result<(), VmError> {
        let res = self.process_frame(frame);

        if let Err(e) = &res {
            debug!(error = %e, "frame rejected");
        }

        self.write_status(result_code(&res));

        res
    }

    fn process_frame(&mut self, frame: &[u8]) -> Result<(), VmError> {
        let mut r = FrameReader::new(frame);

        if r.read_u8() != 0 {
            debug!("immediate eval frame");

            return self.exec_scratch(r.rest().into());
        }

        let exp_len = usize::from(r.read_u16());
        let upd_len = usize::from(r.read_u16());
        let num_last = usize::from(r.read_u16());
        let n_node = usize::from(r.read_u16());
        let n_func = usize::from(r.read_u16());
        let node_growth = usize::from(r.read_u16());
        let func_growth = usize::from(r.read_u16());
        let data_growth = usize::from(r.read_u16());

        self.last.replace(&mut self.meter, num_last)?;

        if node_growth > 0 {
            self.nodes.reserve(&mut self.meter, node_growth)?;
        }

        if func_growth > 0 {
            self.funcs.reserve(&mut self.meter, func_growth)?;
        }

        if data_growth > 0 {
            self.data.grow(&mut self.meter, data_growth)?;
        }

        for _ in 0..n_node {
            let offset = usize::from(r.read_u16());
            let body_len = usize::from(r.read_u16());
            let body = r.read_bytes(body_len);

            self.meter.charge(body_len)?;

            if offset < self.nodes.len() {
                if let Some(old) = self.nodes.install_body(offset, body.into())? {
                    self.meter.credit(old.len());
                }
            } else {
                self.nodes.push_user(crate::value::Value::NIL, Some(body.into()));
            }
        }

        for _ in 0..n_func {
            let offset = usize::from(r.read_u16());
            let body_len = usize::from(r.read_u16());
            let body = r.read_bytes(body_len);

            self.meter.charge(body_len)?;

            if offset < self.funcs.len() {
                let old = self.funcs.replace(offset, body.into());
                self.meter.credit(old.len());
            } else {
                self.funcs.push(body.into());
            }
        }

        if upd_len > 0 {
            let body = r.read_bytes(upd_len);

            self.meter.charge(upd_len)?;

            if let Some(old) = self.update.take() {
                self.meter.credit(old.len());
            }

            self.update = Some(body.into());
        }

        debug!(
            n_node,
            n_func, node_growth, func_growth, data_growth, num_last, upd_len, "program frame installed"
        );

        if exp_len > 0 {
            let exp = r.read_bytes(exp_len);

            return self.exec_scratch(exp.into());
        }

        Ok(())
    }
}
