// Example: drive a virtual list against the in-memory host.
use virtual_list::memory::{ManualScheduler, MemoryDom};
use virtual_list::{Align, Dom, Engine, TAG_NAME, VirtualList};

fn main() {
    let mut dom = MemoryDom::new();
    let host = dom.create_element(TAG_NAME);
    dom.set_attribute(&host, "estimate-size", "32");
    dom.set_attribute(&host, "overscan", "3");
    for _ in 0..10_000 {
        let row = dom.create_element("div");
        dom.set_attribute(&row, "class", "row");
        dom.append_child(&host, &row);
    }

    let mut list = VirtualList::new(dom, ManualScheduler::new(), host);
    list.connect();
    let Some(viewport) = list.parts().map(|p| p.viewport) else {
        return;
    };
    list.dom_mut().set_size(viewport, 320.0, 400.0);
    list.on_resize();
    report("initial", &list);

    list.dom_mut().scroll_to(viewport, 0.0, 50_000.0);
    list.on_scroll();
    report("scrolled", &list);

    // Rows render at 40px instead of the estimated 32px.
    let rendered = list
        .parts()
        .map(|p| list.dom().children(&p.items))
        .unwrap_or_default();
    for row in rendered {
        list.dom_mut().set_size(row, 320.0, 40.0);
    }
    for handle in list.scheduler_mut().take_due() {
        list.on_frame(handle);
    }
    report("measured", &list);

    list.scroll_to_index(9_999, Align::End);
    report("scroll_to_index(9999)", &list);

    list.disconnect();
    println!("state={:?}", list.state());
}

fn report(label: &str, list: &VirtualList<MemoryDom, ManualScheduler>) {
    let window = list.window();
    println!(
        "{label}: offset={} total={} rendered={:?}",
        list.engine().map(|e| e.scroll_offset()).unwrap_or(0),
        list.engine().map(|e| e.total_size()).unwrap_or(0),
        window.first().zip(window.last()).map(|(a, b)| a.index..=b.index),
    );
}
