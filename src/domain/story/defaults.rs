//! Story Context - 内置默认故事板数据
//!
//! 新项目首次加载（或持久化数据缺失/损坏）时使用的种子内容。

use super::{Episode, Lore, Scene, NONE_MARKER};

/// 默认世界观设定
pub fn default_lore() -> Lore {
    Lore::new(
        "近未来城市被一张覆盖现实的数字网格吞没。每一块街区都是可被 Claim 的格子，\
         蓝军以秩序与重复加固统治大片区域，绿军则像藤蔓一样在缝隙中生长。\
         未被占领的中立灰区散布其间，是双方争夺的呼吸孔。",
        "岚：前城市交通仿真工程师，观察模式第七天加入绿军，擅长路径规划。\
         简：绿军前线队长，带岚入局的引路人，直觉敏锐、风格凌厉。\
         Byte：岚的随身数字精灵，负责吐槽与系统提示。\
         阿里亚（Aria Knox）：蓝军指挥官，以军规般的组织力著称。",
        "Claim 占领格子不可逆；格子热度 h 随重复 Claim 上升，越高越难撬动。\
         每日日终结算未领取收益按比例衰减。系统对少数派阵营有平衡补正。\
         宝箱奖励由可验证随机数（VRF）决定，公平且可审计。",
    )
}

/// 默认章节列表（第 1 话）
pub fn default_episodes() -> Vec<Episode> {
    vec![Episode {
        id: 1,
        title: "观察模式的最后一天".to_string(),
        summary: "岚在观察模式的最后一天决定加入绿军，告别旁观者的身份，\
                  通过简的引导踏入数字前线的纷争。"
            .to_string(),
        scenes: vec![
            scene(
                1,
                "灰色网格海",
                "远景，城市街头，地面叠加无尽灰色网格，天空飘着半透明HUD。",
                "一个被数字网格完全覆盖的现实城市。色彩灰暗压抑，只有空中的悬浮界面闪烁着微弱的光。岚孤独地站在街道中心，像是在等待着世界的重启。",
                "“第七天。观察模式的最后一天。”",
                "岚（小声）：“再看一天……就好。”",
                "弹窗：OBSERVER MODE: Day 7/7；“滴——”",
            ),
            scene(
                2,
                "Byte 登场吐槽",
                "中景，岚低头看手机，Byte 从屏幕角落弹出（Q版）。",
                "岚的表情带着些许疲惫和犹豫。Byte是一个充满活力的数字小精灵，它的出现为沉闷的灰色调带来了一抹亮眼的黄色电光。",
                NONE_MARKER,
                "Byte：“你这是研究？这叫拖延。”",
                "System Tip: Choose a faction before Day End.",
            ),
            scene(
                3,
                "蓝色海潮一闪",
                "岚抬头，视角切向远处大片蓝区，像海面发光，热度层级清晰。",
                "远方的蓝军领地展现出极高的工业感和秩序美。深蓝色的能量流像潮汐一样有节奏地律动，给人一种坚不可摧的压迫感。",
                "“蓝军的领地像潮汐，稳定、沉重。”",
                "岚：“如果选蓝……就要守住秩序。”",
                "蓝色标记：HEAT h=6..9",
            ),
            scene(
                4,
                "绿色前线一线生机",
                "横向拉远，画面边缘一条绿色细线蜿蜒，像草从水泥裂缝里钻出。",
                "绿色能量虽然微弱且断断续续，但散发出强烈的生命力。它在灰色网格的缝隙中顽强挣扎，仿佛随时可能掀起一场森林革命。",
                "“绿军的前线像藤蔓，细，却不肯枯萎。”",
                "岚：“如果选绿……就要撬动僵局。”",
                "绿线标记：Frontline",
            ),
            scene(
                5,
                "简的第一次出现",
                "半身近景，简从背后靠近，兜帽阴影盖住眼睛，露出坏笑。",
                "简穿着带有霓虹绿装饰的战术外套，整个人散发着不羁的叛逆感。路灯的光从侧后方打来，勾勒出她神秘且危险的轮廓。",
                NONE_MARKER,
                "简：“站这发呆，会被当间谍。”",
                "脚步“哒”。",
            ),
            scene(
                6,
                "不可逆选择的压迫感",
                "岚手指悬在“Claim”按钮上，按钮巨大特写；简在旁边侧脸。",
                "这一刻空气仿佛凝固。巨大的数字化按钮发着幽光，映照在岚颤抖的指尖上。简在背景中观察着她，眼神中带着审视和期待。",
                "“选择不可逆——这不是游戏提示，是誓约。”",
                "岚：“我怕选错。”简：“你选的不是颜色，是你的时间。”",
                NONE_MARKER,
            ),
            scene(
                7,
                "第一次 Claim：灰转绿",
                "手指按下，网格从灰色瞬间染绿，粒子爆开。",
                "一场视觉盛宴。枯萎的灰色世界在触碰的一瞬间被翠绿色的生命力点燃，绿色的数据粒子像繁星一样向四周迸发，覆盖了周围的街道。",
                NONE_MARKER,
                "Byte：“恭喜，你把自己交给麻烦了。”",
                "Claim Success；control=GREEN；h: 0 → 1；“咔！”",
            ),
            scene(
                8,
                "前线方向的凝视",
                "岚站在绿光里，远处蓝色海潮与绿色细线同框；简转身走向前线。",
                "岚的身影被绿光包裹，她此刻看起来不再迷茫，而是坚定地望向远方。简的背影潇洒地融入了前线的阴影中，宣告着新篇章的开启。",
                "“从这一刻起，她不再只是旁观者。”",
                "简：“欢迎加入。”",
                "Faction Locked: Verdant Order",
            ),
        ],
    }]
}

fn scene(
    id: u32,
    title: &str,
    visual: &str,
    description: &str,
    narrative: &str,
    dialogue: &str,
    ui_sfx: &str,
) -> Scene {
    Scene {
        id,
        title: title.to_string(),
        visual: visual.to_string(),
        description: description.to_string(),
        narrative: narrative.to_string(),
        dialogue: dialogue.to_string(),
        ui_sfx: ui_sfx.to_string(),
        image_url: None,
        video_ref: None,
        is_extended: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::story::SCENES_PER_EPISODE;

    #[test]
    fn test_default_episode_shape() {
        let episodes = default_episodes();
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].id, 1);
        assert_eq!(episodes[0].scenes.len(), SCENES_PER_EPISODE);
    }

    #[test]
    fn test_default_scenes_have_no_media() {
        for scene in &default_episodes()[0].scenes {
            assert!(!scene.has_media());
            assert!(!scene.is_extended);
        }
    }
}
