#![allow(dead_code)]

pub mod temp_files {
    use std::io::Write;

    use tempfile::NamedTempFile;

    /// Creates a temporary file with the given extension; removed on drop
    pub fn create_temp_file(content: &str, ext: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("brrtnav_test_")
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    pub fn create_temp_yaml(content: &str) -> NamedTempFile {
        create_temp_file(content, "yaml")
    }

    pub fn create_temp_json(content: &str) -> NamedTempFile {
        create_temp_file(content, "json")
    }

    pub fn create_temp_toml(content: &str) -> NamedTempFile {
        create_temp_file(content, "toml")
    }
}

pub mod browser {
    use std::cell::RefCell;
    use std::rc::Rc;

    use brrtnav::host::{Host, SimulatedHost};
    use brrtnav::route::{CallbackOutlet, RouteOutlet};
    use brrtnav::{Router, RouterConfig};

    /// A simulated browser at `address` with a router on top
    pub fn open(address: &str) -> (Rc<SimulatedHost>, Router) {
        open_with(address, RouterConfig::default())
    }

    pub fn open_with(address: &str, config: RouterConfig) -> (Rc<SimulatedHost>, Router) {
        let host = Rc::new(SimulatedHost::new(address).unwrap());
        let dyn_host: Rc<dyn Host> = Rc::clone(&host) as Rc<dyn Host>;
        let router = Router::new(dyn_host, config).unwrap();
        (host, router)
    }

    /// Shared log of outlet calls (`show:name`, `hide:name`)
    #[derive(Clone, Default)]
    pub struct Recorder {
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Recorder {
        pub fn outlet(&self, name: &str) -> Rc<dyn RouteOutlet> {
            let (on_show, on_hide) = (Rc::clone(&self.log), Rc::clone(&self.log));
            let (shown, hidden) = (format!("show:{name}"), format!("hide:{name}"));
            Rc::new(
                CallbackOutlet::new()
                    .on_show(move || on_show.borrow_mut().push(shown.clone()))
                    .on_hide(move || on_hide.borrow_mut().push(hidden.clone())),
            )
        }

        pub fn entries(&self) -> Vec<String> {
            self.log.borrow().clone()
        }

        /// Entries recorded since the last call to `take`
        pub fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.log.borrow_mut())
        }

        pub fn count(&self, entry: &str) -> usize {
            self.log.borrow().iter().filter(|e| *e == entry).count()
        }
    }
}
