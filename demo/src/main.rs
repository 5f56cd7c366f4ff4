//! Renders a small page into the headless surface, updates it, and prints what happened.

use std::{cell::Cell, rc::Rc, time::Duration};

use waterfiber::{
    config::scheduler_config_from_env,
    logging::{install_panic_hook, install_tracing},
    prelude::*,
};

fn page(title: &str, visits: i32, on_click: Listener) -> Element {
    create_element(
        "div",
        [("id", "app")],
        [
            create_element("h2", core::iter::empty::<(&str, &str)>(), [title]),
            create_element(
                "p",
                core::iter::empty::<(&str, &str)>(),
                ["Elaborate the core concept of Reactjs"],
            ),
            create_element(
                "a",
                [("href", "https://create-react-app.dev/")],
                ["Official Website"],
            ),
            Element::new("button")
                .attr("onClick", on_click)
                .child(format!("visited {visits} times")),
        ],
    )
}

fn main() -> anyhow::Result<()> {
    install_tracing();
    install_panic_hook();

    let config = scheduler_config_from_env()?;
    let mut root = HeadlessRoot::with_config(config);
    let visits = Rc::new(Cell::new(0));
    let counter = {
        let visits = visits.clone();
        Listener::new(move |_| visits.set(visits.get() + 1))
    };

    // First pass, in 2ms slices.
    root.schedule(page("React Core Principle", visits.get(), counter.clone()));
    let mut slices = 0;
    let summary = loop {
        slices += 1;
        let slice = SliceDeadline::new(Duration::from_millis(2));
        if let WorkStatus::Committed(summary) = root.work(&slice)? {
            break summary;
        }
    };
    tracing::info!(slices, "first render committed");
    println!("{summary:?}\n{}\n", root.to_html());

    root.dispatch_to_first("button", &Event::new("click"));
    root.dispatch_to_first("button", &Event::new("click"));

    let summary = root.render(page("React Core Principle", visits.get(), counter))?;
    println!("{summary:?}\n{}\n", root.to_html());

    let summary = root.render(
        Element::new("div")
            .attr("id", "app")
            .child(Element::new("h1").child("Bye")),
    )?;
    println!("{summary:?}\n{}\n", root.to_html());
    println!("{}", root.snapshot().to_json()?);
    Ok(())
}
