use std::fs;
use std::io;
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use press_client::{
    AuthResponse, Category, Comment, NewPost, Post, PostPage, PostUpdate, PressClient,
    PressClientError,
};

const TOKEN_FILE: &str = ".press_token";
const DEFAULT_SERVER: &str = "http://127.0.0.1:8080";

#[derive(Debug, Parser)]
#[command(name = "press-cli", version, about = "CLI клиент для press-server")]
struct Cli {
    /// Адрес HTTP сервера.
    #[arg(long, global = true, env = "PRESS_SERVER")]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Регистрация пользователя.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Вход пользователя по email.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Работа с категориями.
    Categories {
        #[command(subcommand)]
        command: CategoryCommand,
    },
    /// Список опубликованных постов.
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        /// Слаг категории.
        #[arg(long)]
        category: Option<String>,
    },
    /// Получение поста по id или слагу.
    Get {
        #[arg(long)]
        id: String,
    },
    /// Поиск постов по подстроке.
    Search {
        #[arg(long)]
        q: String,
    },
    /// Создание поста (требует токен).
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        category_id: i64,
        #[arg(long)]
        excerpt: Option<String>,
        /// Теги через запятую.
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        /// Сохранить как черновик.
        #[arg(long)]
        draft: bool,
    },
    /// Обновление поста (требует токен автора или администратора).
    ///
    /// Незаданные поля остаются прежними.
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        excerpt: Option<String>,
        #[arg(long)]
        category_id: Option<i64>,
        /// Теги через запятую.
        #[arg(long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
        #[arg(long)]
        published: Option<bool>,
    },
    /// Удаление поста (требует токен автора или администратора).
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Добавление комментария (требует токен).
    Comment {
        #[arg(long)]
        post_id: i64,
        #[arg(long)]
        content: String,
    },
}

#[derive(Debug, Subcommand)]
enum CategoryCommand {
    /// Список категорий.
    List,
    /// Создание категории (требует токен администратора).
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let server = normalize_server(cli.server.unwrap_or_else(|| DEFAULT_SERVER.to_string()));
    let mut client = PressClient::new(server).map_err(map_client_error)?;

    if let Some(token) = load_token().context("не удалось прочитать .press_token")? {
        client.set_token(token);
    }

    match cli.command {
        Command::Register {
            username,
            email,
            password,
        } => {
            let auth = client
                .register(&username, &email, &password)
                .await
                .map_err(map_client_error)?;
            persist_token(&client).context("не удалось сохранить токен")?;
            print_auth("Регистрация успешна", &auth);
        }
        Command::Login { email, password } => {
            let auth = client
                .login(&email, &password)
                .await
                .map_err(map_client_error)?;
            persist_token(&client).context("не удалось сохранить токен")?;
            print_auth("Вход выполнен", &auth);
        }
        Command::Categories { command } => match command {
            CategoryCommand::List => {
                let categories = client.list_categories().await.map_err(map_client_error)?;
                print_categories(&categories);
            }
            CategoryCommand::Create { name, description } => {
                let category = client
                    .create_category(&name, description.as_deref())
                    .await
                    .map_err(map_client_error)?;
                println!(
                    "Категория создана: id={} slug={}",
                    category.id, category.slug
                );
            }
        },
        Command::List {
            page,
            limit,
            category,
        } => {
            let list = client
                .list_posts(page, limit, category.as_deref())
                .await
                .map_err(map_client_error)?;
            print_list(&list);
        }
        Command::Get { id } => {
            let post = client.get_post(&id).await.map_err(map_client_error)?;
            print_post("Пост", &post);
        }
        Command::Search { q } => {
            let posts = client.search_posts(&q).await.map_err(map_client_error)?;
            println!("Найдено постов: {}", posts.len());
            for post in &posts {
                print_post_line(post);
            }
        }
        Command::Create {
            title,
            content,
            category_id,
            excerpt,
            tags,
            draft,
        } => {
            let new_post = NewPost {
                title,
                content,
                excerpt,
                category_id,
                tags,
                is_published: draft.then_some(false),
            };
            let post = client
                .create_post(&new_post)
                .await
                .map_err(map_client_error)?;
            print_post("Пост создан", &post);
        }
        Command::Update {
            id,
            title,
            content,
            excerpt,
            category_id,
            tags,
            published,
        } => {
            let changes = PostUpdate {
                title,
                content,
                excerpt,
                category_id,
                tags,
                is_published: published,
            };
            let post = client
                .update_post(id, &changes)
                .await
                .map_err(map_client_error)?;
            print_post("Пост обновлён", &post);
        }
        Command::Delete { id } => {
            client.delete_post(id).await.map_err(map_client_error)?;
            println!("Пост удалён: id={id}");
        }
        Command::Comment { post_id, content } => {
            let comments = client
                .add_comment(post_id, &content)
                .await
                .map_err(map_client_error)?;
            println!("Комментарий добавлен");
            print_comments(&comments);
        }
    }

    Ok(())
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn parse_token_content(raw: &str) -> Option<String> {
    let token = raw.trim().to_string();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn load_token() -> io::Result<Option<String>> {
    if !Path::new(TOKEN_FILE).exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(TOKEN_FILE)?;
    Ok(parse_token_content(&raw))
}

fn persist_token(client: &PressClient) -> io::Result<()> {
    if let Some(token) = client.get_token() {
        fs::write(TOKEN_FILE, token)?;
    }
    Ok(())
}

fn map_client_error(err: PressClientError) -> anyhow::Error {
    let message = match err {
        PressClientError::Unauthorized(message) => format!(
            "требуется авторизация ({message}): выполните `press-cli login ...` или `press-cli register ...`"
        ),
        PressClientError::Forbidden(message) => format!("недостаточно прав: {message}"),
        PressClientError::NotFound(message) => format!("ресурс не найден: {message}"),
        PressClientError::InvalidRequest(message) => format!("некорректный запрос: {message}"),
        PressClientError::Server(message) => format!("ошибка сервера: {message}"),
        PressClientError::Http(err) => format!("ошибка HTTP: {err}"),
    };
    anyhow::anyhow!(message)
}

fn print_auth(title: &str, auth: &AuthResponse) {
    println!("{title}");
    println!("token: {}", auth.token);
    println!("user:");
    println!("  id: {}", auth.user.id);
    println!("  username: {}", auth.user.username);
    println!("  email: {}", auth.user.email);
    println!("  role: {}", auth.user.role);
    println!("  created_at: {}", auth.user.created_at);
}

fn print_categories(categories: &[Category]) {
    println!("Категорий: {}", categories.len());
    for category in categories {
        match &category.description {
            Some(description) => println!(
                "- [{}] {} ({}): {description}",
                category.id, category.name, category.slug
            ),
            None => println!("- [{}] {} ({})", category.id, category.name, category.slug),
        }
    }
}

fn print_post(title: &str, post: &Post) {
    println!("{title}");
    println!("id: {}", post.id);
    println!("title: {}", post.title);
    println!("slug: {}", post.slug);
    if let Some(excerpt) = &post.excerpt {
        println!("excerpt: {excerpt}");
    }
    println!("content: {}", post.content);
    if let Some(author) = &post.author {
        println!("author: {} (id={})", author.username, author.id);
    }
    if let Some(category) = &post.category {
        println!("category: {} ({})", category.name, category.slug);
    }
    if !post.tags.is_empty() {
        println!("tags: {}", post.tags.join(", "));
    }
    println!("published: {}", post.is_published);
    println!("views: {}", post.view_count);
    println!("created_at: {}", post.created_at);
    println!("updated_at: {}", post.updated_at);
    if !post.comments.is_empty() {
        print_comments(&post.comments);
    }
}

fn print_post_line(post: &Post) {
    let author = post
        .author
        .as_ref()
        .map(|author| author.username.as_str())
        .unwrap_or("-");
    println!(
        "- [{}] {} /{} (author={author}, views={})",
        post.id, post.title, post.slug, post.view_count
    );
}

fn print_list(list: &PostPage) {
    let pagination = list.pagination;
    println!(
        "Постов: {} (page={}/{}, limit={}, total={})",
        list.posts.len(),
        pagination.page,
        pagination.pages,
        pagination.limit,
        pagination.total
    );

    for post in &list.posts {
        print_post_line(post);
    }
}

fn print_comments(comments: &[Comment]) {
    println!("comments ({}):", comments.len());
    for comment in comments {
        let user = comment
            .user
            .as_ref()
            .map(|user| user.username.as_str())
            .unwrap_or("-");
        println!("  {user} [{}]: {}", comment.created_at, comment.content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_server_keeps_scheme() {
        let s = normalize_server("https://example.com:8080".to_string());
        assert_eq!(s, "https://example.com:8080");
    }

    #[test]
    fn normalize_server_adds_http_scheme() {
        let s = normalize_server("127.0.0.1:8080".to_string());
        assert_eq!(s, "http://127.0.0.1:8080");
    }

    #[test]
    fn parse_token_content_trims_whitespace() {
        let token = parse_token_content("  abc.def.ghi  ");
        assert_eq!(token.as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn parse_token_content_rejects_blank() {
        let token = parse_token_content("   ");
        assert!(token.is_none());
    }

    #[test]
    fn create_command_splits_tags() {
        let cli = Cli::try_parse_from([
            "press-cli",
            "create",
            "--title",
            "Hello",
            "--content",
            "World",
            "--category-id",
            "3",
            "--tags",
            "rust,web",
            "--draft",
        ])
        .expect("arguments must parse");

        match cli.command {
            Command::Create {
                tags,
                draft,
                category_id,
                ..
            } => {
                assert_eq!(tags, vec!["rust".to_string(), "web".to_string()]);
                assert!(draft);
                assert_eq!(category_id, 3);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn get_command_accepts_slug() {
        let cli = Cli::try_parse_from(["press-cli", "get", "--id", "hello-world"])
            .expect("arguments must parse");

        match cli.command {
            Command::Get { id } => assert_eq!(id, "hello-world"),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
