use anyhow::Result;
use resources::{Engine, ResourceConfig, ResourceError, Sprite};

/// Charge des textures/polices depuis la ligne de commande et affiche ce que le cache
/// en a fait.
pub struct App {
    engine: Engine,
}

impl App {
    pub fn new(config: ResourceConfig) -> Self {
        Self {
            engine: Engine::from_config(config),
        }
    }

    pub fn init(&mut self) -> Result<()> {
        for mount in self.engine.mounts.mounts() {
            log::info!("Mount {} -> {:?}", mount.name, mount.base_path);
        }
        Ok(())
    }

    pub fn run(&mut self, paths: &[String]) -> Result<()> {
        let mut sprites = Vec::new();
        let mut failures = 0;

        for path in paths {
            if is_font(path) {
                match self.engine.resources.borrow_mut().get_font(path) {
                    Ok(font) => println!(
                        "{path}: font {} ({} glyphs)",
                        font.family().unwrap_or("<unnamed>"),
                        font.glyph_count()
                    ),
                    Err(err) => {
                        failures += 1;
                        report(path, &err);
                    }
                }
                continue;
            }

            let mut sprite = Sprite::new();
            sprite.resources.attach_resource_manager(&self.engine.resources);
            match sprite.load_texture(path) {
                Ok(()) => {
                    let Some(texture) = sprite.texture() else {
                        continue;
                    };
                    let size = texture.size();
                    let first_pixel = texture
                        .get_pixel(0, 0)
                        .map(|pixel| format!("{:?}", pixel.0))
                        .unwrap_or_else(|err| err.to_string());
                    println!(
                        "{path}: {}x{} {} (anti-aliased: {}, holders: {}), pixel(0, 0) = {first_pixel}",
                        size.x,
                        size.y,
                        if texture.is_vector() { "vector" } else { "bitmap" },
                        texture.is_anti_aliased(),
                        texture.use_count(),
                    );
                    sprites.push(sprite);
                }
                Err(err) => {
                    failures += 1;
                    report(path, &err);
                }
            }
        }

        let released_while_held = self.engine.resources.borrow_mut().clean();
        drop(sprites);
        let released = self.engine.resources.borrow_mut().clean();
        println!(
            "sweep: {released_while_held} released while sprites were alive, {released} after"
        );

        if failures > 0 {
            anyhow::bail!("{failures} resource(s) failed to load");
        }
        Ok(())
    }
}

fn is_font(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.ends_with(".ttf") || lower.ends_with(".otf")
}

fn report(path: &str, err: &ResourceError) {
    log::error!("{path}: {err}");
}
