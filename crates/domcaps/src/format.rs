use domcaps_core::{
    CapsEnum, DiskCapabilities, DomainCapabilities, EnumSet, HostdevCapabilities,
    LoaderCapabilities, OsCapabilities, StringValues,
};

/// Renders the capability description as a `<domainCapabilities>` document.
///
/// The output only depends on the description's contents, so rendering the
/// same description twice yields identical bytes.
pub fn format_xml(caps: &DomainCapabilities) -> String {
    let mut buf = XmlBuffer::default();

    buf.open("domainCapabilities", &[]);
    buf.text_element("path", &caps.path);
    buf.text_element("domain", caps.virt_type.as_str());
    if let Some(machine) = &caps.machine {
        buf.text_element("machine", machine);
    }
    buf.text_element("arch", caps.arch.as_str());
    let max_vcpus = caps.max_vcpus.to_string();
    buf.empty("vcpu", &[("max", max_vcpus.as_str())]);

    format_os(&mut buf, &caps.os);

    buf.open("devices", &[]);
    format_disk(&mut buf, &caps.disk);
    format_hostdev(&mut buf, &caps.hostdev);
    buf.close("devices");

    buf.close("domainCapabilities");
    buf.finish()
}

fn format_os(buf: &mut XmlBuffer, os: &OsCapabilities) {
    if !buf.open_supported("os", os.supported) {
        return;
    }
    format_loader(buf, &os.loader);
    buf.close("os");
}

fn format_loader(buf: &mut XmlBuffer, loader: &LoaderCapabilities) {
    if !buf.open_supported("loader", loader.supported) {
        return;
    }
    format_values(buf, &loader.values);
    format_enum(buf, "type", &loader.types);
    format_enum(buf, "readonly", &loader.readonly);
    buf.close("loader");
}

fn format_disk(buf: &mut XmlBuffer, disk: &DiskCapabilities) {
    if !buf.open_supported("disk", disk.supported) {
        return;
    }
    format_enum(buf, "diskDevice", &disk.disk_device);
    format_enum(buf, "bus", &disk.bus);
    buf.close("disk");
}

fn format_hostdev(buf: &mut XmlBuffer, hostdev: &HostdevCapabilities) {
    if !buf.open_supported("hostdev", hostdev.supported) {
        return;
    }
    format_enum(buf, "mode", &hostdev.mode);
    format_enum(buf, "startupPolicy", &hostdev.startup_policy);
    format_enum(buf, "subsysType", &hostdev.subsys_type);
    format_enum(buf, "capsType", &hostdev.caps_type);
    format_enum(buf, "pciBackend", &hostdev.pci_backend);
    buf.close("hostdev");
}

fn format_values(buf: &mut XmlBuffer, values: &StringValues) {
    for value in values.iter() {
        buf.text_element("value", value);
    }
}

fn format_enum<E: CapsEnum>(buf: &mut XmlBuffer, name: &str, set: &EnumSet<E>) {
    if set.is_empty() {
        buf.empty("enum", &[("name", name)]);
        return;
    }
    buf.open("enum", &[("name", name)]);
    for value in set.iter() {
        buf.text_element("value", value.as_str());
    }
    buf.close("enum");
}

#[derive(Default)]
struct XmlBuffer {
    out: String,
    depth: usize,
}

impl XmlBuffer {
    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
    }

    fn start_tag(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.indent();
        self.out.push('<');
        self.out.push_str(name);
        for (key, value) in attrs {
            self.out.push(' ');
            self.out.push_str(key);
            self.out.push_str("='");
            escape_into(&mut self.out, value);
            self.out.push('\'');
        }
    }

    fn open(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.start_tag(name, attrs);
        self.out.push_str(">\n");
        self.depth += 1;
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.start_tag(name, attrs);
        self.out.push_str("/>\n");
    }

    /// Opens a block carrying a `supported` attribute. Unsupported blocks are
    /// written self-closed and `false` is returned.
    fn open_supported(&mut self, name: &str, supported: bool) -> bool {
        if supported {
            self.open(name, &[("supported", "yes")]);
        } else {
            self.empty(name, &[("supported", "no")]);
        }
        supported
    }

    fn close(&mut self, name: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.indent();
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push_str(">\n");
    }

    fn text_element(&mut self, name: &str, text: &str) {
        self.indent();
        self.out.push('<');
        self.out.push_str(name);
        self.out.push('>');
        escape_into(&mut self.out, text);
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push_str(">\n");
    }

    fn finish(self) -> String {
        self.out
    }
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}
