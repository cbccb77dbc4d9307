use crate::browser::ProjectsBrowser;
use crate::context::Context;
use crate::error::Result;

pub fn run(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let projects = store.list_projects()?;
    let mut browser = ProjectsBrowser::new(projects, store, ctx.base_currency(), ctx.page_size());
    browser.run()
}
