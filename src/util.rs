//! Helpers shared by the test suite and host-side tooling.

#[cfg(feature = "test-helpers")]
pub mod test_helpers {
    //! Frame assembly and machine construction for tests.
    //!
    //! [`ImageBuilder`] produces program-image frames in the exact wire
    //! format the loader parses, the same way the host uploader does.

    use crate::interpreter::Interpreter;
    use crate::transport::MemoryTransport;

    use pulse_asm::Opcode;

    /// A machine wired to an in-memory transport.
    pub fn test_machine(n_inputs: usize, n_outputs: usize) -> Interpreter<MemoryTransport> {
        Interpreter::new(MemoryTransport::new(), n_inputs, n_outputs).expect("machine construction")
    }

    /// An immediate-eval frame around `ops`.
    pub fn eval_frame(ops: &[Opcode]) -> Vec<u8> {
        let mut frame = vec![1u8];
        frame.extend(ops.iter().copied().collect::<Vec<u8>>());

        frame
    }

    /// Builder for program-image frames.
    #[derive(Debug, Default, Clone)]
    pub struct ImageBuilder {
        num_last: u16,
        node_growth: u16,
        func_growth: u16,
        data_growth: u16,
        nodes: Vec<(u16, Vec<u8>)>,
        funcs: Vec<(u16, Vec<u8>)>,
        update: Vec<u8>,
        init: Vec<u8>,
    }

    impl ImageBuilder {
        /// An empty image: no growth, no bodies, no update program.
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of last-value slots the program needs.
        pub fn last_values(mut self, count: u16) -> Self {
            self.num_last = count;
            self
        }

        /// Extend the node registry by `count` entries.
        pub fn grow_nodes(mut self, count: u16) -> Self {
            self.node_growth = count;
            self
        }

        /// Extend the function registry by `count` entries.
        pub fn grow_funcs(mut self, count: u16) -> Self {
            self.func_growth = count;
            self
        }

        /// Extend the data registry by `count` zeroed slots.
        pub fn grow_data(mut self, count: u16) -> Self {
            self.data_growth = count;
            self
        }

        /// Install or patch the updater body of node `offset`.
        pub fn node(mut self, offset: u16, ops: &[Opcode]) -> Self {
            self.nodes.push((offset, ops.iter().copied().collect()));
            self
        }

        /// Install or patch function body `offset`.
        pub fn func(mut self, offset: u16, ops: &[Opcode]) -> Self {
            self.funcs.push((offset, ops.iter().copied().collect()));
            self
        }

        /// Replace the update program.
        pub fn update(mut self, ops: &[Opcode]) -> Self {
            self.update = ops.iter().copied().collect();
            self
        }

        /// Run `ops` once after the frame is installed.
        pub fn init(mut self, ops: &[Opcode]) -> Self {
            self.init = ops.iter().copied().collect();
            self
        }

        /// Assemble the frame payload.
        pub fn finish(&self) -> Vec<u8> {
            let mut frame = vec![0u8];

            frame.extend_from_slice(&(self.init.len() as u16).to_le_bytes());
            frame.extend_from_slice(&(self.update.len() as u16).to_le_bytes());
            frame.extend_from_slice(&self.num_last.to_le_bytes());
            frame.extend_from_slice(&(self.nodes.len() as u16).to_le_bytes());
            frame.extend_from_slice(&(self.funcs.len() as u16).to_le_bytes());
            frame.extend_from_slice(&self.node_growth.to_le_bytes());
            frame.extend_from_slice(&self.func_growth.to_le_bytes());
            frame.extend_from_slice(&self.data_growth.to_le_bytes());

            for (offset, body) in self.nodes.iter().chain(self.funcs.iter()) {
                frame.extend_from_slice(&offset.to_le_bytes());
                frame.extend_from_slice(&(body.len() as u16).to_le_bytes());
                frame.extend_from_slice(body);
            }

            frame.extend_from_slice(&self.update);
            frame.extend_from_slice(&self.init);

            frame
        }
    }
}
