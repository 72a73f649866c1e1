fn main() {
    built::write_built_file().expect("should be able to write build info");
}
