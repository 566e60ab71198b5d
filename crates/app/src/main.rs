use bevy::prelude::*;
use bevy::render::view::screenshot::{save_to_disk, Screenshot};
use bevy::window::PresentMode;
use bevy::winit::{UpdateMode, WinitSettings};

use dashboard::config::DashboardConfig;
use dashboard::data_load::DashboardDataState;
use dashboard::resolver::DashboardScreen;

fn main() {
    let mut app = App::new();

    let config = DashboardConfig::from_env();
    let title = match &config.entity_id {
        Some(id) => format!("Waterwatch - {} {id}", config.variant.key()),
        None => "Waterwatch".to_string(),
    };

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title,
            resolution: (1280.0, 800.0).into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }))
    .insert_resource(WinitSettings {
        focused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(16)),
        unfocused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(100)),
    })
    .insert_resource(config)
    .add_plugins((
        dashboard::DashboardPlugin,
        save::SavePlugin,
        ui::UiPlugin,
    ))
    .add_systems(Startup, spawn_camera);

    // Screenshot mode: captures the mounted screen once data is ready, then exits
    if std::env::var("WATERWATCH_SCREENSHOT").is_ok() {
        app.init_resource::<ScreenshotCountdown>();
        app.add_systems(Update, drive_screenshot);
    }

    app.run();
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// Frames to wait after data is ready before capturing, then before exiting.
#[derive(Resource)]
struct ScreenshotCountdown {
    settle: u32,
    exit: u32,
    taken: bool,
}

impl Default for ScreenshotCountdown {
    fn default() -> Self {
        Self {
            settle: 30,
            exit: 20,
            taken: false,
        }
    }
}

fn drive_screenshot(
    mut commands: Commands,
    mut countdown: ResMut<ScreenshotCountdown>,
    data_state: Res<DashboardDataState>,
    screen: Res<State<DashboardScreen>>,
    mut exit: EventWriter<AppExit>,
) {
    if data_state.is_loading() {
        return;
    }
    if countdown.settle > 0 {
        countdown.settle -= 1;
        return;
    }
    if !countdown.taken {
        let path = format!("/tmp/waterwatch_{:?}.png", screen.get()).to_lowercase();
        info!("Saving screenshot to {path}");
        commands
            .spawn(Screenshot::primary_window())
            .observe(save_to_disk(path));
        countdown.taken = true;
        return;
    }
    if countdown.exit > 0 {
        countdown.exit -= 1;
    } else {
        exit.send(AppExit::Success);
    }
}
