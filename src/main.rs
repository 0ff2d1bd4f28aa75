mod chrome;
mod config;
mod contact;
mod diagnostics;
mod dom;
mod navigation;
mod page;
mod reveal;

fn main() {
    dioxus::launch(page::App);
}
