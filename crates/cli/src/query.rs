use crate::{At, Commands, Page, Target};
use codenav_api::{CodeNavigator, PageRequest, PositionalRequest, RequestContext};
use codenav_core::CodeNavService;
use serde::Serialize;

impl Target {
    fn context(&self) -> RequestContext {
        RequestContext::new(self.repository, &self.commit, &self.path)
    }
}

impl At {
    fn request(&self) -> PositionalRequest {
        self.target.context().at(self.line, self.character)
    }
}

impl Page {
    fn request(&self) -> PageRequest {
        PageRequest {
            limit: self.limit,
            cursor: self.cursor.clone(),
        }
    }
}

fn render(value: &impl Serialize) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub async fn run(service: &CodeNavService, command: Commands) -> anyhow::Result<String> {
    match command {
        Commands::Definitions { at, page } => {
            render(&service.definitions(&at.request(), &page.request()).await?)
        }
        Commands::References { at, page } => {
            render(&service.references(&at.request(), &page.request()).await?)
        }
        Commands::Implementations { at, page } => {
            render(&service.implementations(&at.request(), &page.request()).await?)
        }
        Commands::Hover { at } => render(&service.hover(&at.request()).await?),
        Commands::Stencil { target } => render(&service.stencil(&target.context()).await?),
        Commands::Ranges {
            target,
            start_line,
            end_line,
        } => render(
            &service
                .ranges(&target.context(), start_line, end_line)
                .await?,
        ),
        Commands::Dependencies { target, uploads } => {
            render(&service.dependencies(&target.context(), &uploads).await?)
        }
        Commands::Diagnostics { target, limit } => {
            render(&service.diagnostics(&target.context(), limit).await?)
        }
        Commands::Uploads { target } => {
            render(&service.visible_uploads_for_path(&target.context()).await?)
        }
        Commands::Import { .. } => anyhow::bail!("import is not a query"),
    }
}
